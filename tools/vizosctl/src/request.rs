//! Typed request bodies for the subcommands that take more than an engine
//! instance. Banker's and detection read their instance types directly.

use rand::Rng;
use serde::{Deserialize, Serialize};
use vizos_sim::cpu::{Policy, Process};
use vizos_sim::disk::{DiskPolicy, DiskRequest, DEFAULT_DISK_SIZE};
use vizos_sim::memory::{FitStrategy, ReplacementPolicy};
use vizos_sim::{workloads, PageNo, Size};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CpuRequest {
    pub policy: Policy,
    pub processes: Vec<Process>,
}

/// A disk request plus the policy to run it under.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiskJob {
    pub policy: DiskPolicy,
    pub request: DiskRequest,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllocRequest {
    pub strategy: FitStrategy,
    pub blocks: Vec<Size>,
    pub processes: Vec<Size>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagingRequest {
    pub policy: ReplacementPolicy,
    pub frames: usize,
    pub references: Vec<PageNo>,
}

pub fn random_cpu(rng: &mut impl Rng, count: usize) -> CpuRequest {
    let policy = match rng.gen_range(0..4) {
        0 => Policy::Fcfs,
        1 => Policy::Sjf,
        2 => Policy::Priority {
            preemptive: rng.gen_bool(0.5),
        },
        _ => Policy::RoundRobin {
            quantum: rng.gen_range(1..=4),
        },
    };
    CpuRequest {
        policy,
        processes: workloads::processes(rng, count),
    }
}

pub fn random_disk(rng: &mut impl Rng, count: usize) -> DiskJob {
    let policy = match rng.gen_range(0..4) {
        0 => DiskPolicy::Fcfs,
        1 => DiskPolicy::Sstf,
        2 => DiskPolicy::Scan,
        _ => DiskPolicy::Look,
    };
    DiskJob {
        policy,
        request: workloads::disk_request(rng, count, DEFAULT_DISK_SIZE),
    }
}

pub fn random_alloc(rng: &mut impl Rng, count: usize) -> AllocRequest {
    let strategy = match rng.gen_range(0..3) {
        0 => FitStrategy::First,
        1 => FitStrategy::Best,
        _ => FitStrategy::Worst,
    };
    let (blocks, processes) = workloads::memory(rng, count, count);
    AllocRequest {
        strategy,
        blocks,
        processes,
    }
}

pub fn random_paging(rng: &mut impl Rng, count: usize) -> PagingRequest {
    let policy = if rng.gen_bool(0.5) {
        ReplacementPolicy::Fifo
    } else {
        ReplacementPolicy::Lru
    };
    PagingRequest {
        policy,
        frames: rng.gen_range(2..=4),
        references: workloads::reference_string(rng, count, 8),
    }
}

#[cfg(test)]
mod tests {
    use vizos_sim::disk::Direction;

    use super::*;

    #[test]
    fn test_disk_job_defaults() {
        let job: DiskJob =
            serde_json::from_str(r#"{"policy":"scan","request":{"requests":[5],"head":9}}"#)
                .unwrap();
        assert_eq!(job.policy, DiskPolicy::Scan);
        assert_eq!(job.request.direction, Direction::Up);
        assert_eq!(job.request.disk_size, DEFAULT_DISK_SIZE);

        let body = r#"{"policy":"scan","request":{"requests":[5],"head":9,"rpm":7200}}"#;
        assert!(serde_json::from_str::<DiskJob>(body).is_err());
    }

    #[test]
    fn test_cpu_request_rejects_unknown_fields() {
        let body = r#"{"policy":{"name":"fcfs"},"processes":[],"quantum":2}"#;
        assert!(serde_json::from_str::<CpuRequest>(body).is_err());
    }

    #[test]
    fn test_generated_requests_parse_back() {
        let mut rng = workloads::seeded(3);
        let json = serde_json::to_string(&random_cpu(&mut rng, 4)).unwrap();
        let back: CpuRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.processes.len(), 4);

        let json = serde_json::to_string(&random_paging(&mut rng, 10)).unwrap();
        let back: PagingRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.references.len(), 10);
    }
}
