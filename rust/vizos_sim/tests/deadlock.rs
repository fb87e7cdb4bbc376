//! Banker's algorithm, detection and graph projections.

use vizos_sim::deadlock::{
    self, BankersInstance, Demand, DetectionInstance, DetectionStep, EdgeKind, Node,
};
use vizos_sim::workloads;
use vizos_sim::ProcIdx;

mod common;

fn textbook() -> BankersInstance {
    serde_json::from_str(
        r#"{
            "processes": 5,
            "resources": 3,
            "allocation": [[0,1,0],[2,0,0],[3,0,2],[2,1,1],[0,0,2]],
            "max":        [[7,5,3],[3,2,2],[9,0,2],[2,2,2],[4,3,3]],
            "available":  [3,3,2]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_bankers_rag_matches_matrices() {
    common::setup_test();
    let out = deadlock::bankers(&textbook()).unwrap();

    let g = &out.graph;
    assert_eq!(g.processes.len(), 5);
    // R1: 7 allocated + 3 available
    assert_eq!(g.resources[0].allocated, 7);
    assert_eq!(g.resources[0].total, 10);
    assert_eq!(g.resources[1].total, 5);
    assert_eq!(g.resources[2].total, 7);

    let held = g.edges_of(EdgeKind::Allocation).count();
    let nonzero_alloc = out.allocation.iter().flatten().filter(|&&a| a > 0).count();
    assert_eq!(held, nonzero_alloc);
    assert!(g
        .edges_of(EdgeKind::Request)
        .all(|e| matches!(e.from, Node::Process(_)) && matches!(e.to, Node::Resource(_))));
}

#[test]
fn test_bankers_request_that_makes_state_unsafe() {
    common::setup_test();
    // P2 was granted (1,0,2), then P1 is granted (0,2,0).
    let mut inst = textbook();
    inst.allocation[1] = vec![3, 0, 2];
    inst.allocation[0] = vec![0, 3, 0];
    inst.available = vec![2, 1, 0];
    let out = deadlock::bankers(&inst).unwrap();

    assert!(!out.safe);
    assert!(out.safe_sequence.is_empty());
    assert_eq!(out.need[1], vec![0, 2, 0]);
    assert!(out.to_string().contains("UNSAFE"));
}

#[test]
fn test_rag_wrapper_validates() {
    let mut inst = textbook();
    inst.demand = Demand::Max(vec![vec![1, 1, 1]; 4]);
    let err = deadlock::rag(&inst).unwrap_err();
    assert_eq!(err.field(), "max");
}

#[test]
fn test_detection_trace_shape() {
    common::setup_test();
    let inst = DetectionInstance {
        processes: 3,
        resources: 2,
        allocation: vec![vec![1, 0], vec![0, 1], vec![0, 0]],
        request: vec![vec![0, 1], vec![1, 0], vec![1, 1]],
        available: vec![0, 0],
    };
    let out = deadlock::detect(&inst).unwrap();

    assert!(out.has_deadlock);
    assert_eq!(out.deadlocked, vec![ProcIdx(0), ProcIdx(1)]);
    assert!(out.graph.has_cycle());
    assert_eq!(out.trace.len(), 2);
    assert_eq!(
        out.trace.steps()[1].kind,
        DetectionStep::Pass {
            work: vec![0, 0],
            granted: vec![]
        }
    );
    // P3 holds nothing, so nobody waits for it.
    assert!(out.graph.edges.iter().all(|e| e.to != ProcIdx(2)));
}

#[test]
fn test_wait_for_uses_callers_available() {
    common::setup_test();
    let mut inst = DetectionInstance {
        processes: 2,
        resources: 1,
        allocation: vec![vec![1], vec![1]],
        request: vec![vec![1], vec![1]],
        available: vec![0],
    };
    let g = deadlock::wait_for(&inst).unwrap();
    assert!(g.processes.iter().all(|p| p.deadlocked));

    inst.available = vec![1];
    let g = deadlock::wait_for(&inst).unwrap();
    assert!(g.processes.iter().all(|p| !p.deadlocked));
    assert_eq!(g.edges.len(), 2);
}

#[test]
fn test_generated_instances_are_well_formed() {
    common::setup_test();
    let mut rng = workloads::seeded(common::seed());
    for _ in 0..20 {
        let b = workloads::bankers_instance(&mut rng, 5, 3);
        let out = deadlock::bankers(&b).unwrap();
        assert_eq!(out.safe, out.safe_sequence.len() == 5);

        let d = workloads::detection_instance(&mut rng, 5, 3);
        let out = deadlock::detect(&d).unwrap();
        assert_eq!(out.has_deadlock, !out.deadlocked.is_empty());
    }
}
