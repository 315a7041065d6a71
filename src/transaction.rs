// 🔒 Transaction Boundary Manager
//
// The whole run executes inside one SQLite transaction. Commit happens
// once, after the driver returns Ok. Any error (including a failed COMMIT)
// rolls back, and the connection is always handed back in autocommit mode.

use crate::error::{Result, SyncError};
use rusqlite::{Connection, TransactionBehavior};
use tracing::{info, warn};

/// Run `body` in a single transaction on `conn`.
///
/// `body` sees the transaction as a plain `&Connection`; it must not try to
/// commit or roll back itself.
pub fn run_atomically<T, F>(conn: &mut Connection, body: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    let outcome = {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(|source| SyncError::store("begin transaction", source))?;

        match body(&*tx) {
            Ok(value) => tx
                .commit()
                .map(|()| value)
                .map_err(|source| SyncError::store("commit", source)),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "explicit rollback failed");
                }
                Err(err)
            }
        }
    };

    restore_autocommit(conn);

    match &outcome {
        Ok(_) => info!("transaction committed"),
        Err(err) => warn!(error = %err, "transaction rolled back"),
    }

    outcome
}

/// A failed COMMIT can leave SQLite inside the transaction; make sure it
/// is closed before the connection goes back to the caller.
fn restore_autocommit(conn: &Connection) {
    if conn.is_autocommit() {
        return;
    }
    if let Err(err) = conn.execute_batch("ROLLBACK") {
        warn!(error = %err, "failed to restore autocommit");
    }
}
