use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use employee_sync::source::{
    DEFAULT_ASSIGNMENTS_FILE, DEFAULT_DEPARTMENTS_FILE, DEFAULT_EMPLOYEES_FILE,
};
use employee_sync::{
    db, Dataset, DatasetPaths, EntityKind, FlushCadence, ReconciliationEngine, SyncConfig,
    DEFAULT_BATCH_SIZE,
};

#[derive(Debug, Parser)]
#[command(
    name = "employee-sync",
    about = "Upsert employee, department and assignment CSV files into SQLite",
    version
)]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, env = "EMPLOYEE_SYNC_DATABASE", default_value = "employees.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the employees, departments and dept_emp tables.
    InitDb,
    /// Reconcile the three CSV files into the database in one transaction.
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
struct SyncArgs {
    #[arg(long, value_name = "path", default_value = DEFAULT_EMPLOYEES_FILE)]
    employees: PathBuf,

    #[arg(long, value_name = "path", default_value = DEFAULT_DEPARTMENTS_FILE)]
    departments: PathBuf,

    #[arg(long, value_name = "path", default_value = DEFAULT_ASSIGNMENTS_FILE)]
    assignments: PathBuf,

    /// Records routed between periodic flushes.
    #[arg(long, env = "EMPLOYEE_SYNC_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// `shared` (one counter for all kinds) or `per-kind`.
    #[arg(long, env = "EMPLOYEE_SYNC_CADENCE", default_value = "shared")]
    cadence: FlushCadence,

    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitDb => run_init(&cli.database),
        Command::Sync(args) => run_sync(&cli.database, args),
    }
}

fn run_init(database: &Path) -> Result<()> {
    let conn = db::open(database)?;
    db::setup_database(&conn)?;
    println!("✓ Schema ready in {}", database.display());
    Ok(())
}

fn run_sync(database: &Path, args: SyncArgs) -> Result<()> {
    let config = SyncConfig::new(args.batch_size).with_cadence(args.cadence);
    config.validate()?;

    // Parse everything before touching the store
    let paths = DatasetPaths {
        employees: args.employees,
        departments: args.departments,
        assignments: args.assignments,
    };
    let dataset = Dataset::load(&paths).context("Failed to load input files")?;

    let mut conn = db::open(database)?;
    let report = ReconciliationEngine::with_config(config)
        .run(&mut conn, dataset)
        .context("Reconciliation failed, no changes were committed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
        for kind in EntityKind::ALL {
            println!("  {:<12} {} rows", kind.table(), db::count_rows(&conn, kind)?);
        }
    }

    Ok(())
}
