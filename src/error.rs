// ⚠️ Error model for a reconciliation run
//
// Every failure aborts the run. Nothing is retried; the transaction
// boundary rolls back and the error is handed to the caller unchanged.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = SyncError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A field could not be parsed into its expected type.
    /// Raised while loading input, before any store access.
    #[error("malformed record in {source_name} line {line}: field `{field}` {reason}")]
    MalformedRecord {
        source_name: String,
        line: u64,
        field: &'static str,
        reason: String,
    },

    /// An input file could not be opened or read.
    #[error("failed to read input {path:?}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connectivity or protocol failure talking to the store.
    #[error("store unavailable during {operation}: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The store rejected a write (key or foreign key constraint).
    #[error("constraint violation during {operation}: {source}")]
    ConstraintViolation {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Classify a rusqlite failure for the given operation.
    ///
    /// Constraint failures (primary key, unique, foreign key) map to
    /// `ConstraintViolation`; everything else is treated as the store
    /// being unavailable.
    pub fn store(operation: &'static str, source: rusqlite::Error) -> Self {
        match source.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => {
                SyncError::ConstraintViolation { operation, source }
            }
            _ => SyncError::StoreUnavailable { operation, source },
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, SyncError::ConstraintViolation { .. })
    }

    pub fn is_malformed_record(&self) -> bool {
        matches!(self, SyncError::MalformedRecord { .. })
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, SyncError::StoreUnavailable { .. })
    }
}
