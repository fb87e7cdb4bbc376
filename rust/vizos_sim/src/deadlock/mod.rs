//! Deadlock avoidance and detection engine.
//!
//! - [`bankers`]: Banker's safe-sequence search over allocation/max/available.
//! - [`detect`]: deadlock detection over allocation/request/available.
//! - [`graph`]: resource-allocation and wait-for graphs projected from the
//!   same matrices.
//!
//! Every entry point validates matrix dimensions against the declared
//! process and resource counts before touching any arithmetic. Mismatched
//! instances are rejected, never truncated or padded.

pub mod bankers;
pub mod detection;
pub mod graph;

use crate::error::{Result, ValidationError};
use crate::types::Units;

pub use bankers::{bankers, safe_sequence, BankerStep, BankersInstance, BankersOutcome, Demand};
pub use detection::{detect, find_deadlocked, DetectionInstance, DetectionOutcome, DetectionStep};
pub use graph::{
    rag, resource_allocation_graph, wait_for, wait_for_graph, EdgeKind, Node, ProcessNode,
    RagEdge, ResourceAllocationGraph, ResourceNode, WaitForEdge, WaitForGraph, WaitForNode,
};

/// Row-major `[process][resource]` matrix.
pub type Matrix = Vec<Vec<Units>>;

/// Declared instance dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub processes: usize,
    pub resources: usize,
}

impl Dims {
    pub(crate) fn check_matrix(&self, field: &str, m: &[Vec<Units>]) -> Result<()> {
        if m.len() != self.processes {
            return Err(ValidationError::Dimension {
                field: field.to_string(),
                unit: "rows",
                expected: self.processes,
                actual: m.len(),
            });
        }
        for (i, row) in m.iter().enumerate() {
            if row.len() != self.resources {
                return Err(ValidationError::Dimension {
                    field: format!("{field}[{i}]"),
                    unit: "columns",
                    expected: self.resources,
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn check_vector(&self, field: &str, v: &[Units]) -> Result<()> {
        if v.len() != self.resources {
            return Err(ValidationError::Dimension {
                field: field.to_string(),
                unit: "entries",
                expected: self.resources,
                actual: v.len(),
            });
        }
        Ok(())
    }
}

/// Every resource's allocated units plus its available units must fit in
/// [`Units`], so the work vector can never overflow while it grows.
pub(crate) fn check_totals(allocation: &[Vec<Units>], available: &[Units]) -> Result<()> {
    for (j, &avail) in available.iter().enumerate() {
        let total = allocation
            .iter()
            .try_fold(avail, |acc, row| acc.checked_add(row[j]));
        if total.is_none() {
            return Err(ValidationError::out_of_range(
                format!("available[{j}]"),
                "small enough for allocated plus available units to fit in u32",
                avail,
            ));
        }
    }
    Ok(())
}

/// `demand[j] <= work[j]` for every resource.
pub(crate) fn fits(demand: &[Units], work: &[Units]) -> bool {
    demand.iter().zip(work).all(|(d, w)| d <= w)
}

/// Return a process's holdings to the pool.
pub(crate) fn release(work: &mut [Units], allocation: &[Units]) {
    for (w, a) in work.iter_mut().zip(allocation) {
        *w += a;
    }
}
