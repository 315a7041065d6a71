use crate::entities::{Department, DepartmentAssignment, Employee, EntityKind};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Open a store connection with foreign key enforcement switched on.
pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS employees (
            emp_no INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            hire_date TEXT NOT NULL,
            birth_date TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS departments (
            dept_no TEXT PRIMARY KEY,
            dept_name TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Assignments reference both parents. The checks are deferred to COMMIT:
    // a cadence flush may write an assignment before its employee row is
    // flushed, and a dangling reference must fail the whole run, not a batch.
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS dept_emp (
            emp_no INTEGER NOT NULL
                REFERENCES employees(emp_no) DEFERRABLE INITIALLY DEFERRED,
            dept_no TEXT NOT NULL
                REFERENCES departments(dept_no) DEFERRABLE INITIALLY DEFERRED,
            from_date TEXT NOT NULL,
            to_date TEXT NOT NULL,
            PRIMARY KEY (emp_no, dept_no)
        )",
        [],
    )?;

    Ok(())
}

pub fn count_rows(conn: &Connection, kind: EntityKind) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;

    Ok(count)
}

pub fn get_employee(conn: &Connection, emp_no: i64) -> Result<Option<Employee>> {
    let employee = conn
        .query_row(
            "SELECT emp_no, first_name, last_name, gender, hire_date, birth_date
             FROM employees WHERE emp_no = ?1",
            params![emp_no],
            |row| {
                Ok(Employee {
                    emp_no: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    gender: row.get(3)?,
                    hire_date: row.get(4)?,
                    birth_date: row.get(5)?,
                })
            },
        )
        .optional()?;

    Ok(employee)
}

pub fn get_department(conn: &Connection, dept_no: &str) -> Result<Option<Department>> {
    let department = conn
        .query_row(
            "SELECT dept_no, dept_name FROM departments WHERE dept_no = ?1",
            params![dept_no],
            |row| {
                Ok(Department {
                    dept_no: row.get(0)?,
                    dept_name: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(department)
}

pub fn get_assignment(
    conn: &Connection,
    emp_no: i64,
    dept_no: &str,
) -> Result<Option<DepartmentAssignment>> {
    let assignment = conn
        .query_row(
            "SELECT emp_no, dept_no, from_date, to_date
             FROM dept_emp WHERE emp_no = ?1 AND dept_no = ?2",
            params![emp_no, dept_no],
            |row| {
                Ok(DepartmentAssignment {
                    emp_no: row.get(0)?,
                    dept_no: row.get(1)?,
                    from_date: row.get(2)?,
                    to_date: row.get(3)?,
                })
            },
        )
        .optional()?;

    Ok(assignment)
}

/// All employees ordered by key, for whole-table comparisons.
pub fn get_all_employees(conn: &Connection) -> Result<Vec<Employee>> {
    let mut stmt = conn.prepare(
        "SELECT emp_no, first_name, last_name, gender, hire_date, birth_date
         FROM employees
         ORDER BY emp_no",
    )?;

    let employees = stmt
        .query_map([], |row| {
            Ok(Employee {
                emp_no: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                gender: row.get(3)?,
                hire_date: row.get(4)?,
                birth_date: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(employees)
}
