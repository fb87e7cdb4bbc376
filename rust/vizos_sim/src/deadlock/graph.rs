//! Resource-allocation and wait-for graphs.
//!
//! Both graphs are projections of the instance matrices. Nothing here makes
//! a scheduling decision except [`wait_for_graph`], which asks
//! [`find_deadlocked`] which nodes to flag.

use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use crate::deadlock::detection::find_deadlocked;
use crate::deadlock::{BankersInstance, DetectionInstance};
use crate::error::Result;
use crate::types::{ProcIdx, ResIdx, Units};

/// A graph vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "index", rename_all = "snake_case")]
pub enum Node {
    Process(ProcIdx),
    Resource(ResIdx),
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Process(p) => write!(f, "{p}"),
            Node::Resource(r) => write!(f, "{r}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Resource -> process: units currently held.
    Allocation,
    /// Process -> resource: units still wanted.
    Request,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagEdge {
    pub from: Node,
    pub to: Node,
    pub kind: EdgeKind,
    pub units: Units,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessNode {
    pub id: ProcIdx,
    pub label: String,
    pub allocation: Vec<Units>,
    pub max: Vec<Units>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: ResIdx,
    pub label: String,
    pub allocated: Units,
    /// Allocated plus available.
    pub total: Units,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAllocationGraph {
    pub processes: Vec<ProcessNode>,
    pub resources: Vec<ResourceNode>,
    pub edges: Vec<RagEdge>,
}

impl ResourceAllocationGraph {
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &RagEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }
}

/// Build the resource-allocation graph.
///
/// One allocation edge per non-zero `allocation[i][j]`, one request edge per
/// non-zero `need[i][j]`. Inputs must already have matching dimensions.
pub fn resource_allocation_graph(
    allocation: &[Vec<Units>],
    need: &[Vec<Units>],
    available: &[Units],
) -> ResourceAllocationGraph {
    let mut graph = ResourceAllocationGraph::default();

    for (i, (a_row, n_row)) in allocation.iter().zip(need).enumerate() {
        let id = ProcIdx(i);
        graph.processes.push(ProcessNode {
            id,
            label: id.to_string(),
            allocation: a_row.clone(),
            max: a_row.iter().zip(n_row).map(|(a, n)| a + n).collect(),
        });
    }

    for (j, &avail) in available.iter().enumerate() {
        let id = ResIdx(j);
        let allocated: Units = allocation.iter().map(|row| row[j]).sum();
        graph.resources.push(ResourceNode {
            id,
            label: id.to_string(),
            allocated,
            total: allocated + avail,
        });
    }

    for (i, (a_row, n_row)) in allocation.iter().zip(need).enumerate() {
        for (j, (&a, &n)) in a_row.iter().zip(n_row).enumerate() {
            if a > 0 {
                graph.edges.push(RagEdge {
                    from: Node::Resource(ResIdx(j)),
                    to: Node::Process(ProcIdx(i)),
                    kind: EdgeKind::Allocation,
                    units: a,
                });
            }
            if n > 0 {
                graph.edges.push(RagEdge {
                    from: Node::Process(ProcIdx(i)),
                    to: Node::Resource(ResIdx(j)),
                    kind: EdgeKind::Request,
                    units: n,
                });
            }
        }
    }

    graph
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForNode {
    pub id: ProcIdx,
    pub label: String,
    pub deadlocked: bool,
}

/// `from` waits for `to` on each listed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForEdge {
    pub from: ProcIdx,
    pub to: ProcIdx,
    pub resources: Vec<ResIdx>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForGraph {
    pub processes: Vec<WaitForNode>,
    pub edges: Vec<WaitForEdge>,
}

impl WaitForGraph {
    /// Successors of `p`, in edge order.
    pub fn waits_on(&self, p: ProcIdx) -> impl Iterator<Item = ProcIdx> + '_ {
        self.edges.iter().filter(move |e| e.from == p).map(|e| e.to)
    }

    /// Whether the graph contains a directed cycle.
    ///
    /// A cycle is necessary but not sufficient for deadlock with
    /// multi-unit resources; `deadlocked` flags are authoritative.
    pub fn has_cycle(&self) -> bool {
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for node in &self.processes {
            graph.add_node(node.id.0);
        }
        for edge in &self.edges {
            graph.add_edge(edge.from.0, edge.to.0, ());
        }
        is_cyclic_directed(&graph)
    }
}

/// Project the wait-for graph and flag `deadlocked` processes.
pub(crate) fn build_wait_for(
    allocation: &[Vec<Units>],
    request: &[Vec<Units>],
    deadlocked: &[ProcIdx],
) -> WaitForGraph {
    let processes = (0..allocation.len())
        .map(|i| WaitForNode {
            id: ProcIdx(i),
            label: ProcIdx(i).to_string(),
            deadlocked: deadlocked.contains(&ProcIdx(i)),
        })
        .collect();

    let mut edges = Vec::new();
    for (i, req) in request.iter().enumerate() {
        for (k, held) in allocation.iter().enumerate() {
            if i == k {
                continue;
            }
            let resources: Vec<ResIdx> = req
                .iter()
                .zip(held)
                .enumerate()
                .filter(|(_, (&r, &h))| r > 0 && h > 0)
                .map(|(j, _)| ResIdx(j))
                .collect();
            if !resources.is_empty() {
                edges.push(WaitForEdge {
                    from: ProcIdx(i),
                    to: ProcIdx(k),
                    resources,
                });
            }
        }
    }

    WaitForGraph { processes, edges }
}

/// Build the wait-for graph, flagging the processes that detection run
/// against `available` reports as deadlocked.
pub fn wait_for_graph(
    allocation: &[Vec<Units>],
    request: &[Vec<Units>],
    available: &[Units],
) -> WaitForGraph {
    let (deadlocked, _) = find_deadlocked(allocation, request, available);
    build_wait_for(allocation, request, &deadlocked)
}

/// Validated resource-allocation graph for a Banker's instance.
pub fn rag(inst: &BankersInstance) -> Result<ResourceAllocationGraph> {
    let need = inst.need()?;
    Ok(resource_allocation_graph(
        &inst.allocation,
        &need,
        &inst.available,
    ))
}

/// Validated wait-for graph for a detection instance.
pub fn wait_for(inst: &DetectionInstance) -> Result<WaitForGraph> {
    inst.validate()?;
    Ok(wait_for_graph(
        &inst.allocation,
        &inst.request,
        &inst.available,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_edges_and_totals() {
        let g = resource_allocation_graph(&[vec![1, 0], vec![0, 2]], &[vec![0, 1], vec![1, 0]], &[0, 3]);
        assert_eq!(g.resources[0].total, 1);
        assert_eq!(g.resources[1].allocated, 2);
        assert_eq!(g.resources[1].total, 5);
        assert_eq!(g.processes[0].max, vec![1, 1]);
        assert_eq!(g.edges_of(EdgeKind::Allocation).count(), 2);
        assert_eq!(g.edges_of(EdgeKind::Request).count(), 2);
        assert_eq!(
            g.edges[0],
            RagEdge {
                from: Node::Resource(ResIdx(0)),
                to: Node::Process(ProcIdx(0)),
                kind: EdgeKind::Allocation,
                units: 1,
            }
        );
    }

    #[test]
    fn test_two_process_cycle() {
        // P1 holds R1 wants R2, P2 holds R2 wants R1.
        let alloc = [vec![1, 0], vec![0, 1]];
        let req = [vec![0, 1], vec![1, 0]];

        let g = wait_for_graph(&alloc, &req, &[0, 0]);
        assert_eq!(g.edges.len(), 2);
        assert!(g.has_cycle());
        assert!(g.processes.iter().all(|p| p.deadlocked));

        // Same shape, but a spare unit of R1 breaks the deadlock.
        let g = wait_for_graph(&alloc, &req, &[1, 0]);
        assert!(g.has_cycle());
        assert!(g.processes.iter().all(|p| !p.deadlocked));
    }

    #[test]
    fn test_chain_has_no_cycle() {
        let alloc = [vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]];
        let req = [vec![0, 1, 0], vec![0, 0, 1], vec![0, 0, 0]];
        let g = wait_for_graph(&alloc, &req, &[0, 0, 0]);
        let succ: Vec<ProcIdx> = g.waits_on(ProcIdx(0)).collect();
        assert_eq!(succ, vec![ProcIdx(1)]);
        assert!(!g.has_cycle());
    }
}
