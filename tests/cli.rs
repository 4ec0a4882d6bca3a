use std::process::{Command, Output};

const BINARY: &str = env!("CARGO_BIN_EXE_time_fault_threads");

fn run(args: &[&str]) -> Output {
    Command::new(BINARY)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("unable to run benchmark binary")
}

/// Pull the nanosecond value out of a `Label:\t<n>ns` line.
fn field(stdout: &str, label: &str) -> u64 {
    let line = stdout
        .lines()
        .find(|l| l.starts_with(label))
        .unwrap_or_else(|| panic!("no {} line in {:?}", label, stdout));

    line[label.len()..]
        .trim()
        .trim_end_matches("ns")
        .parse()
        .unwrap()
}

#[test]
fn reports_total_and_average() {
    let out = run(&["4", "1", "5"]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some("Spawning 4 threads each allocating 1 vmas of 5 pages!")
    );
    assert!(lines.next().unwrap().starts_with("Total:\t"));
    assert!(lines.next().unwrap().starts_with("Avg:\t"));
    assert_eq!(lines.next(), None);

    let total = field(&stdout, "Total:");
    let avg = field(&stdout, "Avg:");
    assert!(total > 0);
    assert_eq!(avg, total / 4);
}

#[test]
fn release_flag_is_accepted() {
    let out = run(&["2", "3", "4", "--release"]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(field(&stdout, "Avg:"), field(&stdout, "Total:") / 2);
}

#[test]
fn non_numeric_thread_count_is_zero() {
    let out = run(&["many", "1", "1"]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("Spawning 0 threads each allocating 1 vmas of 1 pages!"));
    assert_eq!(field(&stdout, "Total:"), 0);
    assert_eq!(field(&stdout, "Avg:"), 0);
}

#[test]
fn negative_count_fails_without_summary() {
    let out = run(&["-3"]);
    assert_eq!(out.status.code(), Some(1));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(!stdout.contains("Total:"));

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("thread count must not be negative"));
}

#[test]
fn failed_workers_are_reported_on_stderr() {
    // 2^40 pages fits in a usize but is far beyond any address space, so every mmap fails.
    let out = run(&["2", "1", "1099511627776"]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(field(&stdout, "Total:"), 0);
    assert_eq!(field(&stdout, "Avg:"), 0);

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Failed:\t2 workers"));
    assert!(stderr.contains("mmap of 1099511627776 pages failed"));
}

#[test]
fn overflowing_region_size_is_reported() {
    let out = run(&["1", "1", "99999999999999999999"]);
    assert!(out.status.success());

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("overflows the address space"));
    assert!(stderr.contains("Failed:\t1 workers"));
}

#[test]
fn unallocatable_thread_count_fails_without_summary() {
    let out = run(&["99999999999999999999", "0", "0"]);
    assert_eq!(out.status.code(), Some(1));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(!stdout.contains("Total:"));
    assert!(!stdout.contains("Avg:"));

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("unable to allocate records"));
    assert!(!stderr.contains("panicked"));
}
