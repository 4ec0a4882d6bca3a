//! Spawn all the workers, join all the workers, add up what they measured.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::config::BenchmarkConfig;
use crate::error::RunError;
use crate::worker::{Worker, WorkerOutcome};

/// A spawned worker. Its measurement comes back through the join handle, so only the joiner ever
/// sees it.
#[derive(Debug)]
struct WorkerRecord {
    id: usize,
    handle: JoinHandle<WorkerOutcome>,
}

/// Totals over every worker that finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub total_ns: u64,

    /// `total_ns / finished`, truncated. 0 if nothing finished.
    pub average_ns: u64,

    pub finished: usize,
    pub failed: usize,
}

impl AggregateResult {
    /// Failed workers count toward `failed` and nothing else.
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a WorkerOutcome>,
    {
        let mut result = AggregateResult::default();

        for outcome in outcomes {
            match outcome.duration_ns() {
                Some(ns) => {
                    result.total_ns += ns;
                    result.finished += 1;
                }
                None => result.failed += 1,
            }
        }

        if result.finished > 0 {
            result.average_ns = result.total_ns / result.finished as u64;
        }

        result
    }
}

/// Run the benchmark and aggregate the results.
pub fn run(config: &BenchmarkConfig) -> Result<AggregateResult, RunError> {
    let outcomes = run_workers(config)?;
    Ok(AggregateResult::from_outcomes(&outcomes))
}

/// Run the benchmark and hand back every worker's outcome, in worker id order.
///
/// All workers are spawned before any is joined. If a spawn fails, the workers already running are
/// joined before the error is returned.
pub fn run_workers(config: &BenchmarkConfig) -> Result<Vec<WorkerOutcome>, RunError> {
    spawn_and_join(config, |id, worker| {
        thread::Builder::new()
            .name(format!("fault-worker-{}", id))
            .spawn(move || worker.run())
    })
}

fn spawn_and_join<F>(config: &BenchmarkConfig, mut spawn: F) -> Result<Vec<WorkerOutcome>, RunError>
where
    F: FnMut(usize, Worker) -> io::Result<JoinHandle<WorkerOutcome>>,
{
    let config = Arc::new(config.clone());

    let mut records: Vec<WorkerRecord> = Vec::new();
    records
        .try_reserve_exact(config.thread_count)
        .map_err(|source| RunError::RecordTable {
            threads: config.thread_count,
            source,
        })?;

    for id in 0..config.thread_count {
        match spawn(id, Worker::new(id, Arc::clone(&config))) {
            Ok(handle) => records.push(WorkerRecord { id, handle }),
            Err(source) => {
                error!("spawning worker {} failed: {}", id, source);
                let _ = join_all(records);
                return Err(RunError::Spawn { id, source });
            }
        }
    }

    debug!("spawned {} workers", records.len());

    join_all(records)
}

/// Join every record, even after one has panicked. Reports the first panic.
fn join_all(records: Vec<WorkerRecord>) -> Result<Vec<WorkerOutcome>, RunError> {
    let mut outcomes = Vec::with_capacity(records.len());
    let mut panicked = None;

    for record in records {
        match record.handle.join() {
            Ok(outcome) => outcomes.push(outcome),
            Err(_) => {
                error!("worker {} panicked", record.id);
                panicked.get_or_insert(record.id);
            }
        }
    }

    match panicked {
        Some(id) => Err(RunError::Join { id }),
        None => Ok(outcomes),
    }
}
