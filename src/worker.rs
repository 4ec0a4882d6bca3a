//! One benchmark thread: map `region_count` regions, fault every page in, time the whole thing.

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::BenchmarkConfig;
use crate::error::WorkerError;
use crate::faults::{self, FaultCounts};
use crate::region::Region;
use crate::timer::{self, Timestamp};

/// How a worker ended up. A worker produces exactly one of these and never runs again.
#[derive(Debug)]
pub enum WorkerOutcome {
    Finished {
        duration_ns: u64,

        /// Faults the thread took during the run, if `getrusage` could tell us.
        faults: Option<FaultCounts>,
    },
    Failed(WorkerError),
}

impl WorkerOutcome {
    pub fn duration_ns(&self) -> Option<u64> {
        match self {
            WorkerOutcome::Finished { duration_ns, .. } => Some(*duration_ns),
            WorkerOutcome::Failed(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.duration_ns().is_some()
    }
}

#[derive(Debug)]
pub struct Worker {
    id: usize,
    config: Arc<BenchmarkConfig>,
}

impl Worker {
    pub fn new(id: usize, config: Arc<BenchmarkConfig>) -> Self {
        Worker { id, config }
    }

    /// Run the workload on the calling thread. Consumes the worker, so it can't be rerun.
    pub fn run(self) -> WorkerOutcome {
        let before = faults::thread_faults().ok();

        match self.measure() {
            Ok(duration_ns) => {
                let taken = match (before, faults::thread_faults().ok()) {
                    (Some(before), Some(after)) => Some(after.since(&before)),
                    _ => None,
                };

                debug!(worker = self.id, duration_ns, faults = ?taken, "worker finished");

                WorkerOutcome::Finished {
                    duration_ns,
                    faults: taken,
                }
            }
            Err(err) => {
                error!(worker = self.id, "{}", err);
                WorkerOutcome::Failed(err)
            }
        }
    }

    fn measure(&self) -> Result<u64, WorkerError> {
        let start = Timestamp::now()?;

        for _ in 0..self.config.region_count {
            let mut region = Region::allocate(self.config.pages_per_region)?;
            region.touch_all_pages();

            if !self.config.release_regions {
                region.leak();
            }
        }

        let end = Timestamp::now()?;

        Ok(timer::elapsed(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(region_count: usize, pages_per_region: usize) -> Arc<BenchmarkConfig> {
        Arc::new(BenchmarkConfig {
            thread_count: 1,
            region_count,
            pages_per_region,
            release_regions: true,
        })
    }

    #[test]
    fn finishes_with_a_duration() {
        let outcome = Worker::new(0, config(2, 5)).run();
        match outcome {
            WorkerOutcome::Finished {
                duration_ns,
                faults,
            } => {
                assert!(duration_ns > 0);
                if let Some(faults) = faults {
                    assert!(faults.minor >= 1);
                }
            }
            WorkerOutcome::Failed(e) => panic!("worker failed: {}", e),
        }
    }

    #[test]
    fn no_regions_only_measures_the_clock() {
        let outcome = Worker::new(3, config(0, 10)).run();
        let duration_ns = outcome.duration_ns().unwrap();
        assert!(duration_ns < 1_000_000_000);
    }

    #[test]
    fn allocation_failure_fails_the_worker() {
        let pages = (1usize << 62) / crate::region::page_size();
        let outcome = Worker::new(1, config(1, pages)).run();
        assert!(!outcome.is_finished());
        assert!(matches!(
            outcome,
            WorkerOutcome::Failed(WorkerError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn size_overflow_fails_the_worker() {
        let outcome = Worker::new(2, config(1, usize::MAX)).run();
        assert!(matches!(
            outcome,
            WorkerOutcome::Failed(WorkerError::SizeOverflow { pages }) if pages == usize::MAX
        ));
    }
}
