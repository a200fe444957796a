//! Routing trait and default Dijkstra implementation.
//!
//! The planner calls routing through the [`Router`] trait so an alternative
//! search (A*, bidirectional) can be dropped in without touching graph
//! construction or result shaping.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ct_core::{EdgeId, NodeId};

use crate::error::{PlanResult, RouteError};
use crate::network::TrafficGraph;

// ── Path ──────────────────────────────────────────────────────────────────────

/// Edges to traverse in order and their summed weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub edges: Vec<EdgeId>,
    pub cost: f64,
}

impl Path {
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Nodes visited, `from` first.  Empty for a trivial path.
    pub fn nodes(&self, graph: &TrafficGraph) -> Vec<NodeId> {
        let Some(first) = self.edges.first() else {
            return Vec::new();
        };
        let mut nodes = Vec::with_capacity(self.edges.len() + 1);
        nodes.push(graph.edge_from[first.index()]);
        nodes.extend(self.edges.iter().map(|e| graph.edge_to[e.index()]));
        nodes
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path search.
pub trait Router: Send + Sync {
    /// Minimum-weight path from `from` to `to`.
    ///
    /// `from == to` yields an empty path; no path yields
    /// [`RouteError::NoRoute`].
    fn route(&self, graph: &TrafficGraph, from: NodeId, to: NodeId) -> PlanResult<Path>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over `edge_weight`.
///
/// Ties are broken by heap order on `(cost, NodeId)` and by the first edge
/// found to improve a node, so the result is a deterministic function of the
/// graph.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &TrafficGraph, from: NodeId, to: NodeId) -> PlanResult<Path> {
        dijkstra(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total-ordered `f64` for the heap.  Weights are finite and positive, so
/// `total_cmp` agrees with the numeric order.
#[derive(Copy, Clone, PartialEq, Debug)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(graph: &TrafficGraph, from: NodeId, to: NodeId) -> PlanResult<Path> {
    let n = graph.node_count();
    if from.index() >= n || to.index() >= n {
        return Err(RouteError::NoRoute { from, to });
    }
    if from == to {
        return Ok(Path { edges: vec![], cost: 0.0 });
    }

    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    // Min-heap via Reverse; NodeId as secondary key for deterministic ties.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + graph.edge_weight[edge.index()];

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(RouteError::NoRoute { from, to })
}

fn reconstruct(graph: &TrafficGraph, prev_edge: &[EdgeId], to: NodeId, cost: f64) -> Path {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();
    Path { edges, cost }
}
