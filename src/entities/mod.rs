// Entity Models
// The three fixed record shapes reconciled against the store.
//
// Each entity knows:
// - its natural key (existence check + update target)
// - the SQL it needs (count by key, insert, update by key)
// - how to build itself from a positional CSV row

pub mod employee;
pub mod department;
pub mod assignment;

pub use employee::Employee;
pub use department::Department;
pub use assignment::DepartmentAssignment;

use crate::error::Result;
use crate::source::RowFields;
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

// ============================================================================
// ENTITY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Employee,
    Department,
    Assignment,
}

impl EntityKind {
    /// Processing order. Parents first so association rows are decided
    /// after every key they may reference has been routed.
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Employee,
        EntityKind::Department,
        EntityKind::Assignment,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employees",
            EntityKind::Department => "departments",
            EntityKind::Assignment => "dept_emp",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::Department => "department",
            EntityKind::Assignment => "assignment",
        }
    }
}

// ============================================================================
// SYNC ENTITY TRAIT
// ============================================================================

/// A record shape the engine can upsert.
///
/// Parameter order of `insert_params` / `update_params` / `key_params`
/// must match the placeholders of the matching SQL constant.
pub trait SyncEntity: Sized + Debug {
    type Key: Clone + Eq + Hash + Debug;

    const KIND: EntityKind;

    /// Number of positional fields in one input row.
    const FIELD_COUNT: usize;

    /// `SELECT COUNT(*) ... WHERE <key>`
    const EXISTS_SQL: &'static str;
    const INSERT_SQL: &'static str;
    /// Sets every non-key column, targets the row by key.
    const UPDATE_SQL: &'static str;

    fn key(&self) -> Self::Key;

    fn key_params(&self) -> Vec<&dyn ToSql>;

    fn insert_params(&self) -> Vec<&dyn ToSql>;

    fn update_params(&self) -> Vec<&dyn ToSql>;

    fn from_row(row: &RowFields<'_>) -> Result<Self>;
}
