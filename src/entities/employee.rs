// 👤 Employee - primary entity, keyed by emp_no

use super::{EntityKind, SyncEntity};
use crate::error::Result;
use crate::source::RowFields;
use chrono::NaiveDate;
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Input row: `emp_no,first_name,last_name,gender,hire_date,birth_date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub emp_no: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub hire_date: NaiveDate,
    pub birth_date: NaiveDate,
}

impl Employee {
    pub fn new(
        emp_no: i64,
        first_name: &str,
        last_name: &str,
        gender: &str,
        hire_date: NaiveDate,
        birth_date: NaiveDate,
    ) -> Self {
        Employee {
            emp_no,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            gender: gender.to_string(),
            hire_date,
            birth_date,
        }
    }
}

impl SyncEntity for Employee {
    type Key = i64;

    const KIND: EntityKind = EntityKind::Employee;
    const FIELD_COUNT: usize = 6;

    const EXISTS_SQL: &'static str = "SELECT COUNT(*) FROM employees WHERE emp_no = ?1";
    const INSERT_SQL: &'static str = "INSERT INTO employees (
            emp_no, first_name, last_name, gender, hire_date, birth_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
    const UPDATE_SQL: &'static str = "UPDATE employees
        SET first_name = ?1, last_name = ?2, gender = ?3, hire_date = ?4, birth_date = ?5
        WHERE emp_no = ?6";

    fn key(&self) -> i64 {
        self.emp_no
    }

    fn key_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.emp_no as &dyn ToSql]
    }

    fn insert_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.emp_no as &dyn ToSql,
            &self.first_name,
            &self.last_name,
            &self.gender,
            &self.hire_date,
            &self.birth_date,
        ]
    }

    fn update_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.first_name as &dyn ToSql,
            &self.last_name,
            &self.gender,
            &self.hire_date,
            &self.birth_date,
            &self.emp_no,
        ]
    }

    fn from_row(row: &RowFields<'_>) -> Result<Self> {
        Ok(Employee {
            emp_no: row.integer(0, "emp_no")?,
            first_name: row.text(1, "first_name")?,
            last_name: row.text(2, "last_name")?,
            gender: row.text(3, "gender")?,
            hire_date: row.date(4, "hire_date")?,
            birth_date: row.date(5, "birth_date")?,
        })
    }
}
