//! Monotonic timestamps read straight from `clock_gettime(CLOCK_MONOTONIC)`, so that wall-clock
//! adjustments never leak into a measurement.

use crate::error::WorkerError;

/// Nanoseconds per second.
pub const NS_PER_SEC: i64 = 1_000_000_000;

/// A point on the monotonic clock. `nsec` is always in `0..NS_PER_SEC`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    sec: i64,
    nsec: i64,
}

impl Timestamp {
    /// Read the monotonic clock.
    pub fn now() -> Result<Self, WorkerError> {
        let mut ts = unsafe { std::mem::zeroed::<libc::timespec>() };

        let res = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if res != 0 {
            return Err(WorkerError::ClockUnavailable(errno::errno()));
        }

        Ok(Timestamp {
            sec: ts.tv_sec as i64,
            nsec: ts.tv_nsec as i64,
        })
    }

    #[cfg(test)]
    fn from_parts(sec: i64, nsec: i64) -> Self {
        assert!((0..NS_PER_SEC).contains(&nsec), "nsec out of range: {}", nsec);
        Timestamp { sec, nsec }
    }
}

/// Nanoseconds from `start` to `end`.
///
/// The subsecond parts are subtracted separately, so a negative `nsec` difference borrows from the
/// seconds. Saturates to 0 if `end` is before `start`.
pub fn elapsed(start: Timestamp, end: Timestamp) -> u64 {
    let ns = (end.sec - start.sec)
        .saturating_mul(NS_PER_SEC)
        .saturating_add(end.nsec - start.nsec);

    if ns < 0 {
        0
    } else {
        ns as u64
    }
}
