//! Errors for the fault benchmark.
//!
//! Worker errors stay inside the worker that hit them. Run errors end the whole run.

use std::collections::TryReserveError;
use std::io;

use errno::Errno;

/// Something went wrong inside one worker. Its siblings keep going.
#[derive(thiserror::Error, Debug)]
pub enum WorkerError {
    #[error("clock_gettime failed: {0}")]
    ClockUnavailable(Errno),

    #[error("mmap of {pages} pages failed: {errno}")]
    AllocationFailure { pages: usize, errno: Errno },

    /// The region's byte length doesn't fit in a `usize`, so `mmap` was never called.
    #[error("region of {pages} pages overflows the address space")]
    SizeOverflow { pages: usize },
}

/// The run as a whole could not be carried out, so there is nothing meaningful to report.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("unable to allocate records for {threads} workers: {source}")]
    RecordTable {
        threads: usize,
        source: TryReserveError,
    },

    #[error("failed to spawn worker {id}: {source}")]
    Spawn { id: usize, source: io::Error },

    #[error("failed to join worker {id}: thread panicked")]
    Join { id: usize },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: i64 },
}
