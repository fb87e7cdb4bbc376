//! Best, first and worst fit over a fixed list of blocks.
//!
//! Requests are served in input order against the *remaining* capacity of
//! each block, so one block may hold several processes. Space handed out is
//! never returned within a run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::trace::Trace;
use crate::types::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    First,
    Best,
    Worst,
}

impl fmt::Display for FitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitStrategy::First => write!(f, "first fit"),
            FitStrategy::Best => write!(f, "best fit"),
            FitStrategy::Worst => write!(f, "worst fit"),
        }
    }
}

/// A memory block and its current usage. `allocated + remaining == size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub size: Size,
    pub allocated: Size,
    pub remaining: Size,
}

impl BlockState {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            allocated: 0,
            remaining: size,
        }
    }

    pub fn is_free(&self) -> bool {
        self.allocated == 0
    }

    fn take(&mut self, amount: Size) {
        debug_assert!(amount <= self.remaining);
        self.remaining -= amount;
        self.allocated += amount;
    }
}

/// Where one process ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Index into the request's process list.
    pub process: usize,
    pub size: Size,
    /// Index into the block list, `None` when nothing fit.
    pub block: Option<usize>,
}

impl Placement {
    pub fn is_allocated(&self) -> bool {
        self.block.is_some()
    }
}

/// One request served. `remaining` is the chosen block's capacity after
/// the placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationStep {
    pub placement: Placement,
    pub remaining: Option<Size>,
}

impl fmt::Display for AllocationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.placement;
        match (p.block, self.remaining) {
            (Some(b), Some(r)) => write!(
                f,
                "process {} ({}) -> block {} (remaining {r})",
                p.process + 1,
                p.size,
                b + 1
            ),
            _ => write!(f, "process {} ({}) -> not allocated", p.process + 1, p.size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub strategy: FitStrategy,
    pub placements: Vec<Placement>,
    /// Final state of every block.
    pub blocks: Vec<BlockState>,
    pub allocated: usize,
    pub unallocated: usize,
    pub trace: Trace<AllocationStep>,
}

impl fmt::Display for AllocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory Allocation ({})", self.strategy)?;
        for step in self.trace.kinds() {
            writeln!(f, "  {step}")?;
        }
        writeln!(f, "{:<6} {:>8} {:>10} {:>10}", "block", "size", "allocated", "remaining")?;
        for (i, b) in self.blocks.iter().enumerate() {
            writeln!(
                f,
                "{:<6} {:>8} {:>10} {:>10}",
                i + 1,
                b.size,
                b.allocated,
                b.remaining
            )?;
        }
        writeln!(
            f,
            "allocated: {}  unallocated: {}",
            self.allocated, self.unallocated
        )
    }
}

/// Pick a block for `size`, or `None` if no block has room.
///
/// Best and worst fit only replace the current pick on a strictly better
/// remaining capacity, so ties go to the lowest index.
fn pick(blocks: &[BlockState], size: Size, strategy: FitStrategy) -> Option<usize> {
    let mut eligible = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.remaining >= size);

    match strategy {
        FitStrategy::First => eligible.next().map(|(i, _)| i),
        FitStrategy::Best => eligible
            .fold(None, |best: Option<(usize, Size)>, (i, b)| match best {
                Some((_, r)) if r <= b.remaining => best,
                _ => Some((i, b.remaining)),
            })
            .map(|(i, _)| i),
        FitStrategy::Worst => eligible
            .fold(None, |worst: Option<(usize, Size)>, (i, b)| match worst {
                Some((_, r)) if r >= b.remaining => worst,
                _ => Some((i, b.remaining)),
            })
            .map(|(i, _)| i),
    }
}

/// Place each process in turn. Processes that fit nowhere are reported as
/// unallocated.
pub fn allocate(
    blocks: &[Size],
    processes: &[Size],
    strategy: FitStrategy,
) -> Result<AllocationOutcome> {
    if let Some(i) = processes.iter().position(|&s| s == 0) {
        return Err(ValidationError::out_of_range(
            format!("processes[{i}]"),
            "positive",
            0u64,
        ));
    }

    let mut state: Vec<BlockState> = blocks.iter().copied().map(BlockState::new).collect();
    let mut placements = Vec::with_capacity(processes.len());
    let mut trace = Trace::new();

    for (process, &size) in processes.iter().enumerate() {
        let block = pick(&state, size, strategy);
        let remaining = block.map(|b| {
            state[b].take(size);
            state[b].remaining
        });
        log::trace!("{strategy}: process {process} size {size} -> {block:?}");

        let placement = Placement {
            process,
            size,
            block,
        };
        placements.push(placement);
        trace.record(AllocationStep {
            placement,
            remaining,
        });
    }

    let allocated = placements.iter().filter(|p| p.is_allocated()).count();
    log::debug!(
        "{strategy}: {allocated}/{} processes placed in {} blocks",
        processes.len(),
        blocks.len()
    );

    Ok(AllocationOutcome {
        strategy,
        unallocated: placements.len() - allocated,
        allocated,
        placements,
        blocks: state,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCKS: [Size; 5] = [100, 500, 200, 300, 600];
    const PROCS: [Size; 4] = [212, 417, 112, 426];

    fn blocks_of(out: &AllocationOutcome) -> Vec<Option<usize>> {
        out.placements.iter().map(|p| p.block).collect()
    }

    #[test]
    fn test_first_fit() {
        let out = allocate(&BLOCKS, &PROCS, FitStrategy::First).unwrap();
        assert_eq!(blocks_of(&out), vec![Some(1), Some(4), Some(1), None]);
        assert_eq!(out.blocks[1].remaining, 500 - 212 - 112);
        assert_eq!(out.unallocated, 1);
    }

    #[test]
    fn test_best_fit() {
        let out = allocate(&BLOCKS, &PROCS, FitStrategy::Best).unwrap();
        assert_eq!(blocks_of(&out), vec![Some(3), Some(1), Some(2), Some(4)]);
        assert_eq!(out.allocated, 4);
        assert!(out.blocks[0].is_free());
    }

    #[test]
    fn test_worst_fit() {
        let out = allocate(&BLOCKS, &PROCS, FitStrategy::Worst).unwrap();
        assert_eq!(blocks_of(&out), vec![Some(4), Some(1), Some(4), None]);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let blocks = [50, 80, 80, 50];
        let best = allocate(&blocks, &[40], FitStrategy::Best).unwrap();
        let worst = allocate(&blocks, &[40], FitStrategy::Worst).unwrap();
        assert_eq!(best.placements[0].block, Some(0));
        assert_eq!(worst.placements[0].block, Some(1));
    }

    #[test]
    fn test_block_invariant_holds() {
        for strategy in [FitStrategy::First, FitStrategy::Best, FitStrategy::Worst] {
            let out = allocate(&BLOCKS, &PROCS, strategy).unwrap();
            for b in &out.blocks {
                assert_eq!(b.allocated + b.remaining, b.size);
            }
        }
    }

    #[test]
    fn test_zero_sized_process_is_rejected() {
        let err = allocate(&BLOCKS, &[10, 0], FitStrategy::First).unwrap_err();
        assert_eq!(err.field(), "processes[1]");
    }
}
