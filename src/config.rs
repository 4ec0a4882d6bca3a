//! Benchmark parameters.

use std::convert::TryFrom;

use crate::error::ConfigError;

pub const DEFAULT_THREAD_COUNT: usize = 100;
pub const DEFAULT_REGION_COUNT: usize = 2;
pub const DEFAULT_PAGES_PER_REGION: usize = 10;

/// What each run does. Built once at startup and never mutated; workers share it read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// Number of worker threads.
    pub thread_count: usize,

    /// Number of regions each worker maps and touches.
    pub region_count: usize,

    /// Size of every region, in pages.
    pub pages_per_region: usize,

    /// Unmap each region once it has been touched. Otherwise regions are leaked until exit.
    pub release_regions: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            thread_count: DEFAULT_THREAD_COUNT,
            region_count: DEFAULT_REGION_COUNT,
            pages_per_region: DEFAULT_PAGES_PER_REGION,
            release_regions: false,
        }
    }
}

impl BenchmarkConfig {
    /// Build a config from the raw positional arguments. Missing arguments get the defaults;
    /// present ones are read with [`atoi`], so garbage becomes 0.
    pub fn from_args(
        thread_count: Option<&str>,
        region_count: Option<&str>,
        pages_per_region: Option<&str>,
        release_regions: bool,
    ) -> Result<Self, ConfigError> {
        Ok(BenchmarkConfig {
            thread_count: count("thread count", thread_count, DEFAULT_THREAD_COUNT)?,
            region_count: count("region count", region_count, DEFAULT_REGION_COUNT)?,
            pages_per_region: count("page count", pages_per_region, DEFAULT_PAGES_PER_REGION)?,
            release_regions,
        })
    }
}

fn count(name: &'static str, raw: Option<&str>, default: usize) -> Result<usize, ConfigError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(default),
    };

    let value = atoi(raw);
    if value < 0 {
        return Err(ConfigError::Negative { name, value });
    }

    Ok(usize::try_from(value).unwrap_or(usize::MAX))
}

/// Parse like C's `atoi`: skip leading whitespace, take an optional sign and as many digits as
/// follow, ignore the rest. No digits means 0. Out-of-range values saturate.
pub fn atoi(s: &str) -> i64 {
    let s = s.trim_start_matches(|c: char| c == ' ' || ('\t'..='\r').contains(&c));

    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(d - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }

    value
}
