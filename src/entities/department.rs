// 🏢 Department - category entity, keyed by dept_no

use super::{EntityKind, SyncEntity};
use crate::error::Result;
use crate::source::RowFields;
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Input row: `dept_no,dept_name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub dept_no: String,
    pub dept_name: String,
}

impl Department {
    pub fn new(dept_no: &str, dept_name: &str) -> Self {
        Department {
            dept_no: dept_no.to_string(),
            dept_name: dept_name.to_string(),
        }
    }
}

impl SyncEntity for Department {
    type Key = String;

    const KIND: EntityKind = EntityKind::Department;
    const FIELD_COUNT: usize = 2;

    const EXISTS_SQL: &'static str = "SELECT COUNT(*) FROM departments WHERE dept_no = ?1";
    const INSERT_SQL: &'static str =
        "INSERT INTO departments (dept_no, dept_name) VALUES (?1, ?2)";
    const UPDATE_SQL: &'static str = "UPDATE departments SET dept_name = ?1 WHERE dept_no = ?2";

    fn key(&self) -> String {
        self.dept_no.clone()
    }

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.dept_no as &dyn ToSql]
    }

    fn insert_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.dept_no as &dyn ToSql, &self.dept_name]
    }

    fn update_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.dept_name as &dyn ToSql, &self.dept_no]
    }

    fn from_row(row: &RowFields<'_>) -> Result<Self> {
        Ok(Department {
            dept_no: row.text(0, "dept_no")?,
            dept_name: row.text(1, "dept_name")?,
        })
    }
}
