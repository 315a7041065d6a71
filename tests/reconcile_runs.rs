//! End-to-end runs: CSV files on disk → SQLite database on disk.

use std::fs;
use std::path::Path;

use employee_sync::{db, Dataset, DatasetPaths, EntityKind, ReconciliationEngine, SyncConfig};
use employee_sync::{FlushCadence, SyncError};
use rstest::{fixture, rstest};
use rusqlite::Connection;
use tempfile::TempDir;

const EMPLOYEES: &str = "\
emp_no,first_name,last_name,gender,hire_date,birth_date
1,Ana,Ruiz,F,1990-01-01,1965-05-05
2,Luis,Gil,M,1991-02-02,1966-06-06
3,Marta,Sanz,F,1992-03-03,1967-07-07
4,Pablo,Vega,M,1993-04-04,1968-08-08
5,Irene,Mora,F,1994-05-05,1969-09-09
6,Jorge,Pena,M,1995-06-06,1970-10-10
";

const DEPARTMENTS: &str = "\
dept_no,dept_name
d001,Marketing
d002,Finance
d003,Human Resources
";

const ASSIGNMENTS: &str = "\
emp_no,dept_no,from_date,to_date
1,d001,1990-01-01,9999-01-01
2,d002,1991-02-02,9999-01-01
3,d003,1992-03-03,2000-01-01
6,d001,1995-06-06,9999-01-01
";

/// Total records in the fixture files.
const DATASET_SIZE: usize = 13;

struct Workspace {
    _dir: TempDir,
    paths: DatasetPaths,
    conn: Connection,
}

fn write_inputs(dir: &Path, employees: &str, departments: &str, assignments: &str) -> DatasetPaths {
    let paths = DatasetPaths::in_dir(dir);
    fs::write(&paths.employees, employees).expect("write employees");
    fs::write(&paths.departments, departments).expect("write departments");
    fs::write(&paths.assignments, assignments).expect("write assignments");
    paths
}

#[fixture]
fn workspace() -> Workspace {
    new_workspace()
}

fn new_workspace() -> Workspace {
    let dir = TempDir::new().expect("create temp dir");
    let paths = write_inputs(dir.path(), EMPLOYEES, DEPARTMENTS, ASSIGNMENTS);
    let conn = db::open(&dir.path().join("employees.db")).expect("open database");
    db::setup_database(&conn).expect("create schema");
    Workspace {
        _dir: dir,
        paths,
        conn,
    }
}

/// Every row of every table, in a stable order.
fn snapshot(conn: &Connection) -> Vec<String> {
    let queries = [
        "SELECT emp_no || '|' || first_name || '|' || last_name || '|' || gender || '|' || hire_date || '|' || birth_date FROM employees ORDER BY emp_no",
        "SELECT dept_no || '|' || dept_name FROM departments ORDER BY dept_no",
        "SELECT emp_no || '|' || dept_no || '|' || from_date || '|' || to_date FROM dept_emp ORDER BY emp_no, dept_no",
    ];
    let mut rows = Vec::new();
    for sql in queries {
        let mut stmt = conn.prepare(sql).expect("prepare snapshot");
        let table: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("query snapshot")
            .collect::<Result<_, _>>()
            .expect("read snapshot");
        rows.extend(table);
    }
    rows
}

fn seed_stale_rows(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO employees VALUES (2, 'Luis', 'Old', 'M', '1980-01-01', '1966-06-06');
         INSERT INTO departments VALUES ('d002', 'Accounting');
         INSERT INTO dept_emp VALUES (2, 'd002', '1980-01-01', '1985-01-01');",
    )
    .expect("seed stale rows");
}

#[rstest]
fn loads_and_commits_every_record(mut workspace: Workspace) {
    let dataset = Dataset::load(&workspace.paths).expect("load dataset");
    assert_eq!(dataset.total_records(), DATASET_SIZE);
    assert_eq!(dataset.digest.as_deref().map(str::len), Some(64));

    let report = ReconciliationEngine::new()
        .run(&mut workspace.conn, dataset)
        .expect("run");

    assert_eq!(report.stats.total_records(), DATASET_SIZE);
    assert_eq!(report.stats.total_inserted(), DATASET_SIZE);
    assert_eq!(db::count_rows(&workspace.conn, EntityKind::Employee).unwrap(), 6);
    assert_eq!(db::count_rows(&workspace.conn, EntityKind::Department).unwrap(), 3);
    assert_eq!(db::count_rows(&workspace.conn, EntityKind::Assignment).unwrap(), 4);
}

#[rstest]
fn existing_rows_are_updated_in_place(mut workspace: Workspace) {
    seed_stale_rows(&workspace.conn);
    let dataset = Dataset::load(&workspace.paths).expect("load dataset");

    let report = ReconciliationEngine::new()
        .run(&mut workspace.conn, dataset)
        .expect("run");

    assert_eq!(report.stats.employees.updated, 1);
    assert_eq!(report.stats.departments.updated, 1);
    assert_eq!(report.stats.assignments.updated, 1);

    let luis = db::get_employee(&workspace.conn, 2).unwrap().unwrap();
    assert_eq!(luis.last_name, "Gil");
    assert_eq!(luis.hire_date.to_string(), "1991-02-02");
    let finance = db::get_department(&workspace.conn, "d002").unwrap().unwrap();
    assert_eq!(finance.dept_name, "Finance");
    let link = db::get_assignment(&workspace.conn, 2, "d002").unwrap().unwrap();
    assert_eq!(link.to_date.to_string(), "9999-01-01");
    assert_eq!(db::count_rows(&workspace.conn, EntityKind::Employee).unwrap(), 6);
}

#[rstest]
fn second_run_updates_instead_of_inserting(mut workspace: Workspace) {
    let engine = ReconciliationEngine::new();

    engine
        .run(&mut workspace.conn, Dataset::load(&workspace.paths).unwrap())
        .expect("first run");
    let after_first = snapshot(&workspace.conn);

    let report = engine
        .run(&mut workspace.conn, Dataset::load(&workspace.paths).unwrap())
        .expect("second run");

    assert_eq!(report.stats.total_inserted(), 0);
    assert_eq!(report.stats.total_updated(), DATASET_SIZE);
    assert_eq!(snapshot(&workspace.conn), after_first);
}

#[rstest]
#[case::one(1, FlushCadence::Shared)]
#[case::two(2, FlushCadence::Shared)]
#[case::default(5, FlushCadence::Shared)]
#[case::whole_dataset(DATASET_SIZE, FlushCadence::Shared)]
#[case::larger_than_dataset(100, FlushCadence::Shared)]
#[case::per_kind(2, FlushCadence::PerKind)]
fn final_state_does_not_depend_on_batching(
    #[case] batch_size: usize,
    #[case] cadence: FlushCadence,
) {
    let reference = {
        let mut ws = new_workspace();
        seed_stale_rows(&ws.conn);
        ReconciliationEngine::with_batch_size(5)
            .run(&mut ws.conn, Dataset::load(&ws.paths).unwrap())
            .expect("reference run");
        snapshot(&ws.conn)
    };

    let mut ws = new_workspace();
    seed_stale_rows(&ws.conn);
    let config = SyncConfig::new(batch_size).with_cadence(cadence);
    let report = ReconciliationEngine::with_config(config)
        .run(&mut ws.conn, Dataset::load(&ws.paths).unwrap())
        .expect("run");

    assert_eq!(report.stats.total_records(), DATASET_SIZE);
    assert_eq!(snapshot(&ws.conn), reference);
}

#[rstest]
fn dangling_assignment_commits_nothing(mut workspace: Workspace) {
    seed_stale_rows(&workspace.conn);
    let before = snapshot(&workspace.conn);
    let dir = TempDir::new().unwrap();
    let paths = write_inputs(
        dir.path(),
        EMPLOYEES,
        DEPARTMENTS,
        "emp_no,dept_no,from_date,to_date\n1,d001,1990-01-01,9999-01-01\n777,d001,2000-01-01,9999-01-01\n",
    );

    let err = ReconciliationEngine::new()
        .run(&mut workspace.conn, Dataset::load(&paths).unwrap())
        .unwrap_err();

    assert!(err.is_constraint_violation(), "unexpected error: {err}");
    assert!(workspace.conn.is_autocommit());
    assert_eq!(snapshot(&workspace.conn), before);
}

#[rstest]
fn malformed_row_fails_before_any_write(workspace: Workspace) {
    let dir = TempDir::new().unwrap();
    let paths = write_inputs(
        dir.path(),
        EMPLOYEES,
        DEPARTMENTS,
        "emp_no,dept_no,from_date,to_date\n1,d001,1990-13-45,9999-01-01\n",
    );

    let err = Dataset::load(&paths).unwrap_err();

    match err {
        SyncError::MalformedRecord {
            source_name, line, field, ..
        } => {
            assert_eq!(source_name, "employees_departments_related_dates.csv");
            assert_eq!(line, 2);
            assert_eq!(field, "from_date");
        }
        other => panic!("unexpected error: {other}"),
    }
    for kind in EntityKind::ALL {
        assert_eq!(db::count_rows(&workspace.conn, kind).unwrap(), 0);
    }
}

#[rstest]
fn missing_schema_is_store_unavailable() {
    let dir = TempDir::new().unwrap();
    let paths = write_inputs(dir.path(), EMPLOYEES, DEPARTMENTS, ASSIGNMENTS);
    let mut conn = db::open(&dir.path().join("empty.db")).unwrap();

    let err = ReconciliationEngine::new()
        .run(&mut conn, Dataset::load(&paths).unwrap())
        .unwrap_err();

    assert!(err.is_store_unavailable(), "unexpected error: {err}");
    assert!(conn.is_autocommit());
}
