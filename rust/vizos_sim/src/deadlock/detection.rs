//! Deadlock detection over current requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deadlock::graph::{build_wait_for, WaitForGraph};
use crate::deadlock::{check_totals, fits, release, Dims, Matrix};
use crate::error::Result;
use crate::trace::Trace;
use crate::types::{ProcIdx, Units};

/// A detection problem instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectionInstance {
    pub processes: usize,
    pub resources: usize,
    pub allocation: Matrix,
    /// Outstanding request per process.
    pub request: Matrix,
    pub available: Vec<Units>,
}

impl DetectionInstance {
    pub fn dims(&self) -> Dims {
        Dims {
            processes: self.processes,
            resources: self.resources,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let dims = self.dims();
        dims.check_matrix("allocation", &self.allocation)?;
        dims.check_matrix("request", &self.request)?;
        dims.check_vector("available", &self.available)?;
        check_totals(&self.allocation, &self.available)
    }
}

/// Detection trace step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DetectionStep {
    /// Processes holding nothing, marked finished before the first pass.
    Init { finished: Vec<ProcIdx> },
    /// One sweep over the process list, granting every eligible process.
    Pass {
        /// Work vector at the start of the pass.
        work: Vec<Units>,
        granted: Vec<ProcIdx>,
    },
}

fn names(v: &[ProcIdx]) -> String {
    v.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for DetectionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionStep::Init { finished } => write!(f, "holding nothing: [{}]", names(finished)),
            DetectionStep::Pass { work, granted } => {
                write!(f, "work={work:?} -> granted [{}]", names(granted))
            }
        }
    }
}

/// Result of a detection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    pub has_deadlock: bool,
    pub deadlocked: Vec<ProcIdx>,
    pub trace: Trace<DetectionStep>,
    pub graph: WaitForGraph,
}

impl fmt::Display for DetectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deadlock Detection")?;
        for edge in &self.graph.edges {
            writeln!(f, "  {} waits for {}", edge.from, edge.to)?;
        }
        if self.has_deadlock {
            writeln!(f, "DEADLOCK: {}", names(&self.deadlocked))
        } else {
            writeln!(f, "no deadlock")
        }
    }
}

/// Find the processes that can never finish.
///
/// Processes with an all-zero allocation row start finished. Each pass
/// grants, in index order, every unfinished process whose request fits in
/// work, releasing its allocation immediately; passes repeat until one
/// grants nothing. Inputs must already have matching dimensions.
pub fn find_deadlocked(
    allocation: &[Vec<Units>],
    request: &[Vec<Units>],
    available: &[Units],
) -> (Vec<ProcIdx>, Trace<DetectionStep>) {
    let mut work = available.to_vec();
    let mut finished: Vec<bool> = allocation
        .iter()
        .map(|row| row.iter().all(|&a| a == 0))
        .collect();
    let mut trace = Trace::new();

    trace.record(DetectionStep::Init {
        finished: (0..finished.len())
            .filter(|&i| finished[i])
            .map(ProcIdx)
            .collect(),
    });

    loop {
        let start = work.clone();
        let mut granted = Vec::new();
        for i in 0..allocation.len() {
            if !finished[i] && fits(&request[i], &work) {
                release(&mut work, &allocation[i]);
                finished[i] = true;
                granted.push(ProcIdx(i));
            }
        }

        let progress = !granted.is_empty();
        trace.record(DetectionStep::Pass {
            work: start,
            granted,
        });
        if !progress {
            break;
        }
    }

    let deadlocked = (0..finished.len())
        .filter(|&i| !finished[i])
        .map(ProcIdx)
        .collect();
    (deadlocked, trace)
}

/// Run deadlock detection on a validated instance.
pub fn detect(inst: &DetectionInstance) -> Result<DetectionOutcome> {
    inst.validate()?;

    let (deadlocked, trace) = find_deadlocked(&inst.allocation, &inst.request, &inst.available);
    let graph = build_wait_for(&inst.allocation, &inst.request, &deadlocked);

    log::debug!("detection: {} deadlocked of {}", deadlocked.len(), inst.processes);

    Ok(DetectionOutcome {
        has_deadlock: !deadlocked.is_empty(),
        deadlocked,
        trace,
        graph,
    })
}
