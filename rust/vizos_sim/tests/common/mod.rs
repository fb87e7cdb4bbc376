#![allow(dead_code)]

use simplelog::{Config, LevelFilter, TestLogger};
use vizos_sim::cpu::Process;
use vizos_sim::workloads;

/// Route engine logging to the test harness.
///
/// `init()` fails after the first call in the process; that is ignored.
pub fn setup_test() {
    let level = match std::env::var("VIZOS_LOG").as_deref() {
        Ok("trace") => LevelFilter::Trace,
        Ok("debug") => LevelFilter::Debug,
        _ => LevelFilter::Info,
    };
    let _ = TestLogger::init(level, Config::default());
}

/// Processes from `(id, arrival, burst)` triples.
pub fn procs(spec: &[(&str, u64, u64)]) -> Vec<Process> {
    spec.iter()
        .map(|&(id, arrival, burst)| Process::new(id, arrival, burst))
        .collect()
}

/// Processes from `(id, arrival, burst, priority)` tuples.
pub fn prio_procs(spec: &[(&str, u64, u64, i32)]) -> Vec<Process> {
    spec.iter()
        .map(|&(id, arrival, burst, prio)| Process::new(id, arrival, burst).with_priority(prio))
        .collect()
}

/// Seed from `VIZOS_SEED`, defaulting to the generator's default seed.
pub fn seed() -> u64 {
    std::env::var("VIZOS_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(workloads::DEFAULT_SEED)
}
