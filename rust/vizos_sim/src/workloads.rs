//! Random problem instances for demos and randomized tests.
//!
//! Every generator takes the RNG by reference, so one seed reproduces a whole
//! batch of instances. The engines never call into this module; they only
//! accept explicit instances.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cpu::Process;
use crate::deadlock::{BankersInstance, Demand, DetectionInstance, Matrix};
use crate::disk::{DiskRequest, Direction};
use crate::types::{PageNo, Size, Track, Units};

/// Seed used when the caller supplies none.
pub const DEFAULT_SEED: u64 = 42;

/// Deterministic RNG for `seed`.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `count` processes named `P1..`, arrival `0..=10`, burst `1..=10`,
/// priority `1..=5`.
pub fn processes(rng: &mut impl Rng, count: usize) -> Vec<Process> {
    (0..count)
        .map(|i| {
            Process::new(format!("P{}", i + 1), rng.gen_range(0..=10), rng.gen_range(1..=10))
                .with_priority(rng.gen_range(1..=5))
        })
        .collect()
}

/// `count` track requests and a head position on a disk of `disk_size`
/// tracks, sweeping in a random direction.
///
/// # Panics
/// Panics if `disk_size` is 0.
pub fn disk_request(rng: &mut impl Rng, count: usize, disk_size: Track) -> DiskRequest {
    assert!(disk_size > 0, "disk_size must be positive");
    let requests = (0..count).map(|_| rng.gen_range(0..disk_size)).collect();
    let direction = if rng.gen_bool(0.5) {
        Direction::Up
    } else {
        Direction::Down
    };
    DiskRequest::new(requests, rng.gen_range(0..disk_size))
        .direction(direction)
        .disk_size(disk_size)
}

/// A reference string of `len` pages drawn from `0..pages`.
///
/// # Panics
/// Panics if `pages` is 0.
pub fn reference_string(rng: &mut impl Rng, len: usize, pages: PageNo) -> Vec<PageNo> {
    assert!(pages > 0, "pages must be positive");
    (0..len).map(|_| rng.gen_range(0..pages)).collect()
}

/// Block sizes `100..=600` and process sizes `50..=450`.
pub fn memory(rng: &mut impl Rng, blocks: usize, processes: usize) -> (Vec<Size>, Vec<Size>) {
    let b: Vec<Size> = (0..blocks).map(|_| rng.gen_range(100..=600)).collect();
    let p: Vec<Size> = (0..processes).map(|_| rng.gen_range(50..=450)).collect();
    (b, p)
}

fn matrix(rng: &mut impl Rng, rows: usize, cols: usize, hi: Units) -> Matrix {
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.gen_range(0..=hi)).collect())
        .collect()
}

/// Banker's instance: allocation `0..=3`, need `0..=4` (given as max),
/// available `2..=9`.
pub fn bankers_instance(rng: &mut impl Rng, processes: usize, resources: usize) -> BankersInstance {
    let allocation = matrix(rng, processes, resources, 3);
    let need = matrix(rng, processes, resources, 4);
    let max = allocation
        .iter()
        .zip(&need)
        .map(|(a, n)| a.iter().zip(n).map(|(a, n)| a + n).collect())
        .collect();
    let available = (0..resources).map(|_| rng.gen_range(2..=9)).collect();

    BankersInstance {
        processes,
        resources,
        allocation,
        demand: Demand::Max(max),
        available,
    }
}

/// Detection instance: allocation and request `0..=2`, available `1..=5`.
pub fn detection_instance(
    rng: &mut impl Rng,
    processes: usize,
    resources: usize,
) -> DetectionInstance {
    DetectionInstance {
        processes,
        resources,
        allocation: matrix(rng, processes, resources, 2),
        request: matrix(rng, processes, resources, 2),
        available: (0..resources).map(|_| rng.gen_range(1..=5)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_instances() {
        let a = bankers_instance(&mut seeded(7), 5, 3);
        let b = bankers_instance(&mut seeded(7), 5, 3);
        assert_eq!(a, b);
        assert!(a.need().is_ok());
    }

    #[test]
    fn test_generated_instances_validate() {
        let mut rng = seeded(DEFAULT_SEED);
        assert!(crate::cpu::fcfs(&processes(&mut rng, 6)).is_ok());
        let req = disk_request(&mut rng, 8, 200);
        assert!(req.requests.iter().all(|&t| t < 200));
        assert!(crate::deadlock::detect(&detection_instance(&mut rng, 4, 3)).is_ok());
        let refs = reference_string(&mut rng, 20, 6);
        assert!(refs.iter().all(|&p| p < 6));
    }
}
