// 🔗 DepartmentAssignment - links an employee to a department for a period
//
// Keyed by (emp_no, dept_no). Referential integrity is left to the store:
// a dangling reference fails at commit.

use super::{EntityKind, SyncEntity};
use crate::error::Result;
use crate::source::RowFields;
use chrono::NaiveDate;
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Input row: `emp_no,dept_no,from_date,to_date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAssignment {
    pub emp_no: i64,
    pub dept_no: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl DepartmentAssignment {
    pub fn new(emp_no: i64, dept_no: &str, from_date: NaiveDate, to_date: NaiveDate) -> Self {
        DepartmentAssignment {
            emp_no,
            dept_no: dept_no.to_string(),
            from_date,
            to_date,
        }
    }
}

impl SyncEntity for DepartmentAssignment {
    type Key = (i64, String);

    const KIND: EntityKind = EntityKind::Assignment;
    const FIELD_COUNT: usize = 4;

    const EXISTS_SQL: &'static str =
        "SELECT COUNT(*) FROM dept_emp WHERE emp_no = ?1 AND dept_no = ?2";
    const INSERT_SQL: &'static str = "INSERT INTO dept_emp (emp_no, dept_no, from_date, to_date)
        VALUES (?1, ?2, ?3, ?4)";
    const UPDATE_SQL: &'static str = "UPDATE dept_emp SET from_date = ?1, to_date = ?2
        WHERE emp_no = ?3 AND dept_no = ?4";

    fn key(&self) -> (i64, String) {
        (self.emp_no, self.dept_no.clone())
    }

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.emp_no as &dyn ToSql, &self.dept_no]
    }

    fn insert_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.emp_no as &dyn ToSql, &self.dept_no, &self.from_date, &self.to_date]
    }

    fn update_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.from_date as &dyn ToSql, &self.to_date, &self.emp_no, &self.dept_no]
    }

    fn from_row(row: &RowFields<'_>) -> Result<Self> {
        Ok(DepartmentAssignment {
            emp_no: row.integer(0, "emp_no")?,
            dept_no: row.text(1, "dept_no")?,
            from_date: row.date(2, "from_date")?,
            to_date: row.date(3, "to_date")?,
        })
    }
}
