//! Traffic graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges are the `EdgeId`s
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! Every road segment contributes two directed edges (the graph is
//! undirected).  Each edge remembers the index of the segment it came from so
//! the planner can report road names and scores for the chosen path.
//!
//! # Weights
//!
//! ```text
//! weight = length_m × (1 + score/100 × congestion_penalty_factor)
//! ```
//!
//! Scores are clamped to [0, 100] and weights to at least [`MIN_EDGE_WEIGHT`],
//! so every weight is strictly positive and finite.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used to
//! snap named locations onto graph nodes.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use ct_core::{EdgeId, GeoPoint, NodeId, RoutingParams};
use ct_sim::Snapshot;

/// Lower bound on any edge weight.
pub const MIN_EDGE_WEIGHT: f64 = 1e-6;

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Only used for ordering;
    /// the snap tolerance is checked with the haversine distance.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── TrafficGraph ──────────────────────────────────────────────────────────────

/// Undirected intersection graph in CSR format plus a spatial index.
///
/// Built fresh from a snapshot for every route query; never mutated.
pub struct TrafficGraph {
    /// Position of each intersection, on the 4-decimal grid.
    pub node_pos: Vec<GeoPoint>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each edge (for path reconstruction).
    pub edge_from: Vec<NodeId>,

    pub edge_to: Vec<NodeId>,

    /// Physical length in metres.
    pub edge_length_m: Vec<f64>,

    /// Congestion-adjusted cost used by Dijkstra.
    pub edge_weight: Vec<f64>,

    /// Index into `Snapshot::segments` of the segment each edge came from.
    pub edge_segment: Vec<usize>,

    spatial_idx: RTree<NodeEntry>,
}

impl TrafficGraph {
    /// A graph with no nodes or edges.
    pub fn empty() -> Self {
        TrafficGraphBuilder::new().build()
    }

    /// Build the graph for `snapshot`: one undirected edge per segment,
    /// nodes keyed by endpoint coordinates on the 4-decimal grid.
    ///
    /// Node ids follow first appearance in segment order (start before end),
    /// so the same snapshot always yields the same graph.  Segments whose two
    /// endpoints share a node are skipped.
    pub fn from_snapshot(snapshot: &Snapshot, params: &RoutingParams) -> Self {
        let mut b = TrafficGraphBuilder::with_capacity(snapshot.len() + 1, snapshot.len() * 2);

        for (idx, seg) in snapshot.segments.iter().enumerate() {
            let a = b.intersection(seg.start);
            let c = b.intersection(seg.end);
            if a == c {
                continue;
            }
            let length_m = b.node_pos(a).distance_m(b.node_pos(c));
            let weight = congestion_weight(length_m, seg.congestion_score, params.congestion_penalty_factor);
            b.add_road(a, c, length_m, weight, idx);
        }

        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node nearest to `pos`, if it lies within `tolerance_m` metres.
    pub fn snap_to_node(&self, pos: GeoPoint, tolerance_m: f64) -> Option<NodeId> {
        let entry = self.spatial_idx.nearest_neighbor(&[pos.lat, pos.lon])?;
        let d = self.node_pos[entry.id.index()].distance_m(pos);
        (d <= tolerance_m).then_some(entry.id)
    }
}

/// Congestion-adjusted traversal cost of a road of `length_m` metres.
pub fn congestion_weight(length_m: f64, score: f64, penalty: f64) -> f64 {
    let w = length_m * congestion_factor(score, penalty);
    if w.is_finite() { w.max(MIN_EDGE_WEIGHT) } else { MIN_EDGE_WEIGHT }
}

/// `1 + score/100 × penalty`, with the score clamped to [0, 100].
pub fn congestion_factor(score: f64, penalty: f64) -> f64 {
    let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) };
    1.0 + score / 100.0 * penalty
}

// ── TrafficGraphBuilder ───────────────────────────────────────────────────────

/// Construct a [`TrafficGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ct_core::GeoPoint;
/// use ct_spatial::TrafficGraphBuilder;
///
/// let mut b = TrafficGraphBuilder::new();
/// let a = b.intersection(GeoPoint::new(40.7128, -74.0060));
/// let c = b.intersection(GeoPoint::new(40.7138, -74.0050));
/// b.add_road(a, c, 140.0, 168.0, 0);
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 2); // bidirectional
/// ```
pub struct TrafficGraphBuilder {
    nodes:     Vec<GeoPoint>,
    by_key:    FxHashMap<(i64, i64), NodeId>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
    weight:   f64,
    segment:  usize,
}

impl TrafficGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), by_key: FxHashMap::default(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            by_key:    FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// The `NodeId` of the intersection at `pos` (4-decimal grid), adding it
    /// if it is new.
    pub fn intersection(&mut self, pos: GeoPoint) -> NodeId {
        let next = NodeId(self.nodes.len() as u32);
        let id = *self.by_key.entry(pos.grid_key()).or_insert(next);
        if id == next {
            self.nodes.push(pos.rounded());
        }
        id
    }

    /// Add a **directed** edge.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64, weight: f64, segment: usize) {
        let weight = if weight.is_finite() { weight.max(MIN_EDGE_WEIGHT) } else { MIN_EDGE_WEIGHT };
        self.raw_edges.push(RawEdge { from, to, length_m, weight, segment });
    }

    /// Add edges in **both directions** for one road segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64, weight: f64, segment: usize) {
        self.add_directed_edge(a, b, length_m, weight, segment);
        self.add_directed_edge(b, a, length_m, weight, segment);
    }

    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`TrafficGraph`].
    ///
    /// Edges are sorted stably by source node, so edges leaving the same node
    /// keep insertion (segment) order.
    pub fn build(self) -> TrafficGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.length_m).collect();
        let edge_weight:   Vec<f64>    = raw.iter().map(|e| e.weight).collect();
        let edge_segment:  Vec<usize>  = raw.iter().map(|e| e.segment).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        TrafficGraph {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_weight,
            edge_segment,
            spatial_idx,
        }
    }
}

impl Default for TrafficGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
