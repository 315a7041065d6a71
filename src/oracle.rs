// 🔎 Existence Oracle - point lookup by natural key
//
// Reads go through the same connection (and open transaction) the flushes
// write to. SQLite gives a connection read-your-own-writes, so a key is
// visible here once its batch has been flushed, never while still pending.

use crate::entities::SyncEntity;
use crate::error::{Result, SyncError};
use rusqlite::Connection;

pub struct ExistenceOracle<'c> {
    conn: &'c Connection,
}

impl<'c> ExistenceOracle<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        ExistenceOracle { conn }
    }

    /// Does a row with `record`'s key exist right now?
    pub fn exists<E: SyncEntity>(&self, record: &E) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare_cached(E::EXISTS_SQL)
            .map_err(|source| SyncError::store("prepare existence check", source))?;

        let count: i64 = stmt
            .query_row(record.key_params().as_slice(), |row| row.get(0))
            .map_err(|source| SyncError::store("existence check", source))?;

        Ok(count > 0)
    }
}
