// ⚖️ Reconciliation Engine - upsert a dataset into the store atomically
//
// Flow:
//   Dataset → driver (existence check → insert/update batch → flush)
//           → single transaction → ReconciliationReport
//
// Either every entity kind is committed or nothing is.

use crate::config::{FlushCadence, SyncConfig};
use crate::driver;
use crate::error::Result;
use crate::source::Dataset;
use crate::transaction::run_atomically;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

// ============================================================================
// STATISTICS
// ============================================================================

/// Per entity kind counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    /// Records routed to a batch
    pub records: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Non-empty batched writes executed
    pub batches: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub employees: KindStats,
    pub departments: KindStats,
    pub assignments: KindStats,
}

impl RunStats {
    pub fn total_records(&self) -> usize {
        self.employees.records + self.departments.records + self.assignments.records
    }

    pub fn total_inserted(&self) -> usize {
        self.employees.inserted + self.departments.inserted + self.assignments.inserted
    }

    pub fn total_updated(&self) -> usize {
        self.employees.updated + self.departments.updated + self.assignments.updated
    }
}

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub batch_size: usize,
    pub cadence: FlushCadence,
    pub stats: RunStats,
    /// SHA-256 of the input files, if the dataset came from disk
    pub input_digest: Option<String>,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        format!(
            "Run {}: {} records ({} inserted, {} updated) | employees {}/{} | departments {}/{} | assignments {}/{} (inserted/updated)",
            self.run_id,
            self.stats.total_records(),
            self.stats.total_inserted(),
            self.stats.total_updated(),
            self.stats.employees.inserted,
            self.stats.employees.updated,
            self.stats.departments.inserted,
            self.stats.departments.updated,
            self.stats.assignments.inserted,
            self.stats.assignments.updated,
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    pub config: SyncConfig,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        ReconciliationEngine {
            config: SyncConfig::default(),
        }
    }

    pub fn with_batch_size(batch_size: usize) -> Self {
        ReconciliationEngine {
            config: SyncConfig::new(batch_size),
        }
    }

    pub fn with_config(config: SyncConfig) -> Self {
        ReconciliationEngine { config }
    }

    /// Reconcile `dataset` into the store behind `conn` as one unit.
    ///
    /// On error nothing from this run is visible in the store and `conn`
    /// is back in autocommit mode.
    pub fn run(&self, conn: &mut Connection, dataset: Dataset) -> Result<ReconciliationReport> {
        self.config.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let input_digest = dataset.digest.clone();

        info!(
            %run_id,
            batch_size = self.config.batch_size,
            cadence = %self.config.cadence,
            records = dataset.total_records(),
            "starting reconciliation run"
        );

        let stats = run_atomically(conn, |tx| driver::reconcile(tx, dataset, &self.config))?;

        let report = ReconciliationReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            batch_size: self.config.batch_size,
            cadence: self.config.cadence,
            stats,
            input_digest,
        };

        info!(
            %run_id,
            inserted = stats.total_inserted(),
            updated = stats.total_updated(),
            "reconciliation run committed"
        );

        Ok(report)
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
