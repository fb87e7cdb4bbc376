//! Banker's algorithm: safe-sequence search.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deadlock::graph::{resource_allocation_graph, ResourceAllocationGraph};
use crate::deadlock::{check_totals, fits, release, Dims, Matrix};
use crate::error::{Result, ValidationError};
use crate::trace::Trace;
use crate::types::{ProcIdx, Units};

/// Outstanding demand, given either as maximum claims or directly as need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demand {
    /// Maximum claim per process; need = max - allocation.
    Max(Matrix),
    /// Remaining need per process.
    Need(Matrix),
}

/// A Banker's problem instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankersInstance {
    pub processes: usize,
    pub resources: usize,
    pub allocation: Matrix,
    #[serde(flatten)]
    pub demand: Demand,
    pub available: Vec<Units>,
}

impl BankersInstance {
    pub fn dims(&self) -> Dims {
        Dims {
            processes: self.processes,
            resources: self.resources,
        }
    }

    /// Validate dimensions and derive the need matrix.
    pub fn need(&self) -> Result<Matrix> {
        let dims = self.dims();
        dims.check_matrix("allocation", &self.allocation)?;
        dims.check_vector("available", &self.available)?;
        check_totals(&self.allocation, &self.available)?;

        match &self.demand {
            Demand::Need(need) => {
                dims.check_matrix("need", need)?;
                for (i, (n_row, a_row)) in need.iter().zip(&self.allocation).enumerate() {
                    for (j, (&n, &a)) in n_row.iter().zip(a_row).enumerate() {
                        if n.checked_add(a).is_none() {
                            return Err(ValidationError::out_of_range(
                                format!("need[{i}][{j}]"),
                                "small enough for allocation plus need to fit in u32",
                                n,
                            ));
                        }
                    }
                }
                Ok(need.clone())
            }
            Demand::Max(max) => {
                dims.check_matrix("max", max)?;
                let mut need = Vec::with_capacity(self.processes);
                for (i, (m_row, a_row)) in max.iter().zip(&self.allocation).enumerate() {
                    let mut row = Vec::with_capacity(self.resources);
                    for (j, (&m, &a)) in m_row.iter().zip(a_row).enumerate() {
                        if m < a {
                            return Err(ValidationError::NegativeNeed {
                                field: format!("max[{i}][{j}]"),
                                max: m,
                                allocation: a,
                            });
                        }
                        row.push(m - a);
                    }
                    need.push(row);
                }
                Ok(need)
            }
        }
    }
}

/// One pass over the process list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankerStep {
    /// Work vector at the start of the pass.
    pub work: Vec<Units>,
    /// Process selected in this pass, if any.
    pub chosen: Option<ProcIdx>,
    /// Allocation returned to work by the chosen process.
    pub released: Vec<Units>,
}

impl fmt::Display for BankerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chosen {
            Some(p) => write!(f, "work={:?} -> {p} finishes, releases {:?}", self.work, self.released),
            None => write!(f, "work={:?} -> no process can proceed", self.work),
        }
    }
}

/// Result of a Banker's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankersOutcome {
    pub allocation: Matrix,
    pub max: Matrix,
    pub need: Matrix,
    pub available: Vec<Units>,
    pub safe: bool,
    /// Discovery order; complete only when `safe`.
    pub safe_sequence: Vec<ProcIdx>,
    pub trace: Trace<BankerStep>,
    pub graph: ResourceAllocationGraph,
}

impl fmt::Display for BankersOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Banker's Algorithm")?;
        writeln!(f, "{:<4} {:<16} {:<16} {:<16}", "", "allocation", "max", "need")?;
        for (i, ((a, m), n)) in self.allocation.iter().zip(&self.max).zip(&self.need).enumerate() {
            writeln!(
                f,
                "{:<4} {:<16} {:<16} {:<16}",
                ProcIdx(i).to_string(),
                format!("{a:?}"),
                format!("{m:?}"),
                format!("{n:?}")
            )?;
        }
        writeln!(f, "available: {:?}", self.available)?;
        let seq: Vec<String> = self.safe_sequence.iter().map(|p| p.to_string()).collect();
        if self.safe {
            writeln!(f, "SAFE, sequence: {}", seq.join(" -> "))
        } else {
            writeln!(f, "UNSAFE, finished before stalling: {}", seq.join(" -> "))
        }
    }
}

/// Search for a safe sequence.
///
/// Each pass scans processes in index order and selects the first
/// unfinished one whose need fits in work; the next pass restarts from the
/// lowest index. Every pass is recorded, including the final one that finds
/// nothing. Inputs must already have matching dimensions.
pub fn safe_sequence(
    allocation: &[Vec<Units>],
    need: &[Vec<Units>],
    available: &[Units],
) -> (Vec<ProcIdx>, Trace<BankerStep>) {
    let mut work = available.to_vec();
    let mut finished = vec![false; allocation.len()];
    let mut sequence = Vec::new();
    let mut trace = Trace::new();

    loop {
        let chosen = (0..allocation.len()).find(|&i| !finished[i] && fits(&need[i], &work));
        let Some(i) = chosen else {
            trace.record(BankerStep {
                work: work.clone(),
                chosen: None,
                released: Vec::new(),
            });
            break;
        };

        trace.record(BankerStep {
            work: work.clone(),
            chosen: Some(ProcIdx(i)),
            released: allocation[i].clone(),
        });
        log::trace!("{} finishes with work={:?}", ProcIdx(i), work);

        release(&mut work, &allocation[i]);
        finished[i] = true;
        sequence.push(ProcIdx(i));
    }

    (sequence, trace)
}

/// Run the Banker's algorithm on a validated instance.
pub fn bankers(inst: &BankersInstance) -> Result<BankersOutcome> {
    let need = inst.need()?;
    let max: Matrix = inst
        .allocation
        .iter()
        .zip(&need)
        .map(|(a, n)| a.iter().zip(n).map(|(a, n)| a + n).collect())
        .collect();

    let (sequence, trace) = safe_sequence(&inst.allocation, &need, &inst.available);
    let safe = sequence.len() == inst.processes;
    let graph = resource_allocation_graph(&inst.allocation, &need, &inst.available);

    log::debug!(
        "banker's: {} processes, {} resources, safe={}",
        inst.processes,
        inst.resources,
        safe
    );

    Ok(BankersOutcome {
        allocation: inst.allocation.clone(),
        max,
        need,
        available: inst.available.clone(),
        safe,
        safe_sequence: sequence,
        trace,
        graph,
    })
}
