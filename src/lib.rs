//! Utilities for page fault latency experiments. These are mostly wrappers around libc.
//!
//! The benchmark spawns a number of threads. Each thread maps a few fresh anonymous regions and
//! writes to every page of each, so that every write takes a page fault. Each thread times its
//! own loop with the monotonic clock, and the times are added up once every thread has been joined.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod faults;
pub mod region;
pub mod timer;
pub mod worker;

pub use config::BenchmarkConfig;
pub use coordinator::{run, AggregateResult};
pub use error::{ConfigError, RunError, WorkerError};
