//! Page fault counters for the calling thread, from `getrusage(RUSAGE_THREAD)`.

use std::mem::MaybeUninit;

use errno::Errno;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaultCounts {
    /// Faults serviced without I/O.
    pub minor: u64,

    /// Faults that needed I/O.
    pub major: u64,
}

impl FaultCounts {
    /// The faults taken between `earlier` and `self`.
    pub fn since(&self, earlier: &FaultCounts) -> FaultCounts {
        FaultCounts {
            minor: self.minor.saturating_sub(earlier.minor),
            major: self.major.saturating_sub(earlier.major),
        }
    }
}

/// Fault counts of the calling thread so far.
pub fn thread_faults() -> Result<FaultCounts, Errno> {
    let usage = unsafe {
        let mut usage = MaybeUninit::<libc::rusage>::uninit();
        if libc::getrusage(libc::RUSAGE_THREAD, usage.as_mut_ptr()) != 0 {
            return Err(errno::errno());
        }
        usage.assume_init()
    };

    Ok(FaultCounts {
        minor: usage.ru_minflt as u64,
        major: usage.ru_majflt as u64,
    })
}
