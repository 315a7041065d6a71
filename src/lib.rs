// Employee Sync - Core Library
// Upserts employees, departments and their assignments from CSV into SQLite,
// batched, in a single all-or-nothing transaction.

pub mod error;
pub mod config;
pub mod entities;
pub mod source;         // Record Source - CSV → typed records
pub mod oracle;         // Existence Oracle - point lookup by key
pub mod accumulator;    // Statement Accumulator - insert/update batches
pub mod driver;         // Reconciliation Driver - routing + flush cadence
pub mod transaction;    // Transaction Boundary Manager
pub mod reconciliation; // Engine + run report
pub mod db;

// Re-export commonly used types
pub use error::{Result, SyncError};
pub use config::{FlushCadence, SyncConfig, DEFAULT_BATCH_SIZE};
pub use entities::{
    Department, DepartmentAssignment, Employee, EntityKind, SyncEntity,
};
pub use source::{read_records, Dataset, DatasetPaths};
pub use oracle::ExistenceOracle;
pub use accumulator::{Accumulator, FlushOutcome};
pub use driver::reconcile;
pub use transaction::run_atomically;
pub use reconciliation::{KindStats, ReconciliationEngine, ReconciliationReport, RunStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
