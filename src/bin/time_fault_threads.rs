//! Spawn a bunch of threads that each mmap a few regions and fault in every page. Report the total
//! and average time the threads took.
//!
//! NOTE: all measurements use `CLOCK_MONOTONIC` and are reported in nanoseconds.
//!
//! Set `RUST_LOG=debug` to see each worker's duration and fault counts on stderr.

use std::process::ExitCode;

use clap::clap_app;

use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use faultbench::{coordinator, BenchmarkConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let matches = clap_app! { time_fault_threads =>
        (about: "Measures page fault latency with many threads faulting in fresh anonymous memory")
        (@setting AllowNegativeNumbers)
        (@arg THREADS: "The number of threads to spawn [default: 100]")
        (@arg VMAS: "The number of regions each thread maps [default: 2]")
        (@arg PAGES: "The number of pages in each region [default: 10]")
        (@arg RELEASE: -r --release "Unmap each region after touching it instead of leaking it")
    }
    .get_matches();

    let config = match BenchmarkConfig::from_args(
        matches.value_of("THREADS"),
        matches.value_of("VMAS"),
        matches.value_of("PAGES"),
        matches.is_present("RELEASE"),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Spawning {} threads each allocating {} vmas of {} pages!",
        config.thread_count, config.region_count, config.pages_per_region
    );

    let result = match coordinator::run(&config) {
        Ok(result) => result,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if result.failed > 0 {
        eprintln!("Failed:\t{} workers", result.failed);
    }

    println!("Total:\t{}ns", result.total_ns);
    println!("Avg:\t{}ns", result.average_ns);

    ExitCode::SUCCESS
}
