//! CPU scheduling scenarios.

use vizos_sim::cpu::{self, CpuEvent, Policy};

mod common;
use common::{prio_procs, procs};

#[test]
fn test_fcfs_convoy() {
    common::setup_test();
    let s = cpu::fcfs(&procs(&[("P1", 0, 24), ("P2", 0, 3), ("P3", 0, 3)])).unwrap();

    let waits: Vec<u64> = s.processes.iter().map(|p| p.waiting).collect();
    assert_eq!(waits, vec![0, 24, 27]);
    assert_eq!(s.metrics.avg_waiting, 17.0);
    assert_eq!(s.metrics.cpu_utilization, 1.0);
}

#[test]
fn test_sjf_staggered_arrivals() {
    common::setup_test();
    let s = cpu::sjf(&procs(&[("P1", 0, 8), ("P2", 1, 4), ("P3", 2, 9), ("P4", 3, 5)])).unwrap();

    assert_eq!(s.dispatch_order(), vec!["P1", "P2", "P4", "P3"]);
    assert_eq!(s.report("P3").unwrap().completion, 26);
    assert_eq!(s.metrics.avg_waiting, 7.75);
}

#[test]
fn test_priority_nonpreemptive() {
    common::setup_test();
    let s = cpu::priority(
        &prio_procs(&[
            ("P1", 0, 10, 3),
            ("P2", 0, 1, 1),
            ("P3", 0, 2, 4),
            ("P4", 0, 1, 5),
            ("P5", 0, 5, 2),
        ]),
        false,
    )
    .unwrap();

    assert_eq!(s.dispatch_order(), vec!["P2", "P5", "P1", "P3", "P4"]);
    assert_eq!(s.metrics.avg_waiting, 8.2);
    assert_eq!(s.total_time(), 19);
}

#[test]
fn test_round_robin_long_job() {
    common::setup_test();
    let s = cpu::round_robin(&procs(&[("P1", 0, 24), ("P2", 0, 3), ("P3", 0, 3)]), 4).unwrap();

    assert_eq!(s.report("P1").unwrap().completion, 30);
    assert_eq!(s.report("P2").unwrap().completion, 7);
    assert_eq!(s.report("P3").unwrap().completion, 10);
    assert_eq!(s.slices("P1").count(), 6);
    assert_eq!(s.report("P3").unwrap().response, 7);
    let preempts = s.trace.count(|e| matches!(e, CpuEvent::Preempt { .. }));
    assert_eq!(preempts, 5);
}

#[test]
fn test_idle_gap_is_traced_and_lowers_utilization() {
    common::setup_test();
    let s = cpu::fcfs(&procs(&[("A", 0, 2), ("B", 5, 3)])).unwrap();

    assert!(s
        .trace
        .kinds()
        .any(|e| *e == CpuEvent::Idle { from: 2, to: 5 }));
    assert_eq!(s.total_time(), 8);
    assert_eq!(s.metrics.cpu_utilization, 5.0 / 8.0);
    assert_eq!(s.metrics.throughput, 2.0 / 8.0);
}

#[test]
fn test_policy_dispatch_through_simulate() {
    common::setup_test();
    let p = procs(&[("A", 0, 3), ("B", 1, 1)]);
    for policy in [
        Policy::Fcfs,
        Policy::Sjf,
        Policy::Priority { preemptive: false },
        Policy::Priority { preemptive: true },
        Policy::RoundRobin { quantum: 1 },
    ] {
        let s = cpu::simulate(&p, policy).unwrap();
        assert_eq!(s.policy, policy);
        assert_eq!(s.total_time(), 4);
        assert_eq!(s.metrics.completed, 2);
    }
}

#[test]
fn test_schedule_serializes_to_json() {
    let s = cpu::fcfs(&procs(&[("A", 0, 1)])).unwrap();
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["policy"]["name"], "fcfs");
    assert_eq!(v["timeline"][0]["pid"], "A");
    assert_eq!(v["trace"][0]["kind"]["event"], "arrive");
}
