// 📦 Statement Accumulator - pending inserts and updates for one kind
//
// No I/O until `flush`. A flush writes the insert batch, then the update
// batch, each through a single cached prepared statement, then clears both.

use crate::entities::SyncEntity;
use crate::error::{Result, SyncError};
use crate::reconciliation::KindStats;
use rusqlite::{Connection, ToSql};
use std::collections::HashSet;
use tracing::debug;

/// Rows written by one `flush`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub inserted: usize,
    pub updated: usize,
}

impl FlushOutcome {
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.updated == 0
    }
}

pub struct Accumulator<E: SyncEntity> {
    pending_inserts: Vec<E>,
    pending_updates: Vec<E>,
    /// Keys with an operation waiting in either batch.
    pending_keys: HashSet<E::Key>,
    stats: KindStats,
}

impl<E: SyncEntity> Accumulator<E> {
    pub fn new() -> Self {
        Accumulator {
            pending_inserts: Vec::new(),
            pending_updates: Vec::new(),
            pending_keys: HashSet::new(),
            stats: KindStats::default(),
        }
    }

    pub fn add_insert(&mut self, record: E) {
        self.pending_keys.insert(record.key());
        self.pending_inserts.push(record);
        self.stats.records += 1;
    }

    pub fn add_update(&mut self, record: E) {
        self.pending_keys.insert(record.key());
        self.pending_updates.push(record);
        self.stats.records += 1;
    }

    pub fn has_pending(&self, key: &E::Key) -> bool {
        self.pending_keys.contains(key)
    }

    pub fn pending_inserts(&self) -> &[E] {
        &self.pending_inserts
    }

    pub fn pending_updates(&self) -> &[E] {
        &self.pending_updates
    }

    pub fn is_empty(&self) -> bool {
        self.pending_inserts.is_empty() && self.pending_updates.is_empty()
    }

    pub fn stats(&self) -> &KindStats {
        &self.stats
    }

    pub fn into_stats(self) -> KindStats {
        self.stats
    }

    /// Write both pending batches, inserts first. No-op when empty.
    pub fn flush(&mut self, conn: &Connection) -> Result<FlushOutcome> {
        if self.is_empty() {
            return Ok(FlushOutcome::default());
        }

        let inserted = execute_batch(conn, E::INSERT_SQL, &self.pending_inserts, E::insert_params)
            .map_err(|source| SyncError::store("insert batch", source))?;
        let updated = execute_batch(conn, E::UPDATE_SQL, &self.pending_updates, E::update_params)
            .map_err(|source| SyncError::store("update batch", source))?;

        if inserted > 0 {
            self.stats.batches += 1;
        }
        if updated > 0 {
            self.stats.batches += 1;
        }
        self.stats.inserted += inserted;
        self.stats.updated += updated;

        self.pending_inserts.clear();
        self.pending_updates.clear();
        self.pending_keys.clear();

        debug!(
            kind = E::KIND.name(),
            inserted, updated, "flushed batch"
        );

        Ok(FlushOutcome { inserted, updated })
    }
}

impl<E: SyncEntity> Default for Accumulator<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `sql` once per record on one prepared statement, in order.
fn execute_batch<E>(
    conn: &Connection,
    sql: &str,
    records: &[E],
    params: fn(&E) -> Vec<&dyn ToSql>,
) -> rusqlite::Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn.prepare_cached(sql)?;
    for record in records {
        stmt.execute(params(record).as_slice())?;
    }

    Ok(records.len())
}
