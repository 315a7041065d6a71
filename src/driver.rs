// 🔁 Reconciliation Driver
//
// Walks employees, departments, then assignments in source order. Each
// record gets a point existence check and is routed to its kind's insert
// or update batch. Every `batch_size` routed records the accumulator of
// the kind being processed is flushed; all accumulators are flushed once
// more at the end. The first error aborts the walk.

use crate::accumulator::Accumulator;
use crate::config::{FlushCadence, SyncConfig};
use crate::entities::{Department, DepartmentAssignment, Employee, EntityKind, SyncEntity};
use crate::error::Result;
use crate::oracle::ExistenceOracle;
use crate::reconciliation::RunStats;
use crate::source::Dataset;
use rusqlite::Connection;
use tracing::debug;

/// Periodic flush trigger.
#[derive(Debug, Clone, Copy)]
pub struct FlushCounter {
    routed: usize,
    batch_size: usize,
}

impl FlushCounter {
    pub fn new(batch_size: usize) -> Self {
        FlushCounter {
            routed: 0,
            batch_size,
        }
    }

    /// Count one routed record; true when a cadence flush is due.
    pub fn tick(&mut self) -> bool {
        self.routed += 1;
        self.routed % self.batch_size == 0
    }

    pub fn reset(&mut self) {
        self.routed = 0;
    }

    pub fn routed(&self) -> usize {
        self.routed
    }
}

/// Mutable state of one run: the counter and one accumulator per kind.
pub struct RunContext {
    counter: FlushCounter,
    cadence: FlushCadence,
    employees: Accumulator<Employee>,
    departments: Accumulator<Department>,
    assignments: Accumulator<DepartmentAssignment>,
}

impl RunContext {
    pub fn new(config: &SyncConfig) -> Self {
        RunContext {
            counter: FlushCounter::new(config.batch_size),
            cadence: config.cadence,
            employees: Accumulator::new(),
            departments: Accumulator::new(),
            assignments: Accumulator::new(),
        }
    }

    fn begin_kind(&mut self, kind: EntityKind) {
        if self.cadence == FlushCadence::PerKind {
            self.counter.reset();
        }
        debug!(
            kind = kind.name(),
            routed = self.counter.routed(),
            "processing kind"
        );
    }

    /// Unconditional final flush, in processing order.
    fn flush_all(&mut self, conn: &Connection) -> Result<()> {
        self.employees.flush(conn)?;
        self.departments.flush(conn)?;
        self.assignments.flush(conn)?;
        Ok(())
    }

    fn into_stats(self) -> RunStats {
        RunStats {
            employees: self.employees.into_stats(),
            departments: self.departments.into_stats(),
            assignments: self.assignments.into_stats(),
        }
    }
}

/// Upsert the whole dataset through `conn`.
///
/// Does not open or close a transaction; see
/// [`crate::transaction::run_atomically`].
pub fn reconcile(conn: &Connection, dataset: Dataset, config: &SyncConfig) -> Result<RunStats> {
    config.validate()?;

    let oracle = ExistenceOracle::new(conn);
    let mut ctx = RunContext::new(config);

    let Dataset {
        employees,
        departments,
        assignments,
        ..
    } = dataset;

    ctx.begin_kind(EntityKind::Employee);
    route(conn, &oracle, &mut ctx.counter, &mut ctx.employees, employees)?;

    ctx.begin_kind(EntityKind::Department);
    route(conn, &oracle, &mut ctx.counter, &mut ctx.departments, departments)?;

    ctx.begin_kind(EntityKind::Assignment);
    route(conn, &oracle, &mut ctx.counter, &mut ctx.assignments, assignments)?;

    ctx.flush_all(conn)?;

    Ok(ctx.into_stats())
}

fn route<E: SyncEntity>(
    conn: &Connection,
    oracle: &ExistenceOracle<'_>,
    counter: &mut FlushCounter,
    acc: &mut Accumulator<E>,
    records: Vec<E>,
) -> Result<()> {
    for record in records {
        // A repeated key must see its earlier write before being decided
        if acc.has_pending(&record.key()) {
            debug!(kind = E::KIND.name(), key = ?record.key(), "repeated key, flushing early");
            acc.flush(conn)?;
        }

        if oracle.exists(&record)? {
            acc.add_update(record);
        } else {
            acc.add_insert(record);
        }

        if counter.tick() {
            acc.flush(conn)?;
        }
    }

    Ok(())
}
