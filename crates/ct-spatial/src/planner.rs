//! Congestion-aware route planning.
//!
//! # Travel time
//!
//! Each path segment takes `length / speed × factor` minutes, where
//! `factor = 1 + score/100 × penalty` is the same multiplier that weighted
//! the edge.  The route total is therefore
//!
//! ```text
//! estimated_time = total_distance / speed × average_congestion_factor
//! ```
//!
//! with the average taken over distance (equal to `path cost /
//! total_distance`).

use serde::Serialize;
use tracing::debug;

use ct_core::{CongestionLevel, GeoPoint, NodeId, RoutingParams};
use ct_sim::Snapshot;

use crate::error::{PlanResult, RouteError};
use crate::locations::{Location, LocationRegistry};
use crate::network::{TrafficGraph, congestion_factor};
use crate::router::{DijkstraRouter, Router};

// ── Results ───────────────────────────────────────────────────────────────────

/// One road traversed by a route.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteSegment {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub road_id: String,
    pub road_name: String,
    pub distance_m: f64,
    pub congestion_score: f64,
    pub congestion_level: CongestionLevel,
    pub congestion_factor: f64,
    pub estimated_time_min: f64,
}

/// A successful route query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteResult {
    pub start_location: String,
    pub end_location: String,
    pub start_node: GeoPoint,
    pub end_node: GeoPoint,
    /// Intersections from start to end, inclusive.
    pub path_coordinates: Vec<GeoPoint>,
    pub segments: Vec<RouteSegment>,
    pub total_distance_m: f64,
    pub estimated_time_min: f64,
    pub average_congestion_factor: f64,
    /// Timestamp of the snapshot the route was computed against.
    pub snapshot_timestamp: i64,
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

/// Resolves labels, builds the graph for the given snapshot, and runs the
/// router.  Holds no per-query state.
pub struct RoutePlanner<R: Router = DijkstraRouter> {
    locations: LocationRegistry,
    params:    RoutingParams,
    router:    R,
}

impl RoutePlanner<DijkstraRouter> {
    pub fn new(locations: LocationRegistry, params: RoutingParams) -> Self {
        Self { locations, params, router: DijkstraRouter }
    }
}

impl<R: Router> RoutePlanner<R> {
    pub fn with_router(locations: LocationRegistry, params: RoutingParams, router: R) -> Self {
        Self { locations, params, router }
    }

    pub fn locations(&self) -> &LocationRegistry {
        &self.locations
    }

    pub fn params(&self) -> &RoutingParams {
        &self.params
    }

    /// Plan a route from `start_label` to `end_label` under the congestion
    /// in `snapshot`.
    pub fn find_route(&self, start_label: &str, end_label: &str, snapshot: &Snapshot) -> PlanResult<RouteResult> {
        let start = self.locations.resolve(start_label)?;
        let end = self.locations.resolve(end_label)?;
        if start.point.grid_key() == end.point.grid_key() {
            return Err(identical(start, end));
        }

        let graph = TrafficGraph::from_snapshot(snapshot, &self.params);
        if graph.is_empty() {
            return Err(RouteError::EmptyNetwork);
        }

        let tolerance = self.params.snap_tolerance_m;
        let from = graph
            .snap_to_node(start.point, tolerance)
            .ok_or_else(|| RouteError::OffNetwork(start.label.clone()))?;
        let to = graph
            .snap_to_node(end.point, tolerance)
            .ok_or_else(|| RouteError::OffNetwork(end.label.clone()))?;
        if from == to {
            return Err(identical(start, end));
        }

        let path = self.router.route(&graph, from, to)?;
        debug!(
            start = %start.label,
            end = %end.label,
            edges = path.edges.len(),
            cost = path.cost,
            "route found"
        );

        Ok(self.summarise(&graph, snapshot, start, end, from, to, &path.edges))
    }

    #[allow(clippy::too_many_arguments)]
    fn summarise(
        &self,
        graph:    &TrafficGraph,
        snapshot: &Snapshot,
        start:    &Location,
        end:      &Location,
        from:     NodeId,
        to:       NodeId,
        edges:    &[ct_core::EdgeId],
    ) -> RouteResult {
        let speed = self.params.speed_m_per_min();
        let penalty = self.params.congestion_penalty_factor;

        let segments: Vec<RouteSegment> = edges
            .iter()
            .map(|&e| {
                let seg = &snapshot.segments[graph.edge_segment[e.index()]];
                let distance_m = graph.edge_length_m[e.index()];
                let factor = congestion_factor(seg.congestion_score, penalty);
                RouteSegment {
                    from: graph.node_pos[graph.edge_from[e.index()].index()],
                    to: graph.node_pos[graph.edge_to[e.index()].index()],
                    road_id: seg.road_id.clone(),
                    road_name: seg.road_name.clone(),
                    distance_m,
                    congestion_score: seg.congestion_score,
                    congestion_level: seg.congestion_level,
                    congestion_factor: factor,
                    estimated_time_min: distance_m / speed * factor,
                }
            })
            .collect();

        let mut path_coordinates = Vec::with_capacity(segments.len() + 1);
        path_coordinates.push(graph.node_pos[from.index()]);
        path_coordinates.extend(segments.iter().map(|s| s.to));

        let total_distance_m: f64 = segments.iter().map(|s| s.distance_m).sum();
        let estimated_time_min: f64 = segments.iter().map(|s| s.estimated_time_min).sum();
        let average_congestion_factor = if total_distance_m > 0.0 {
            segments.iter().map(|s| s.distance_m * s.congestion_factor).sum::<f64>() / total_distance_m
        } else {
            1.0
        };

        RouteResult {
            start_location: start.label.clone(),
            end_location: end.label.clone(),
            start_node: graph.node_pos[from.index()],
            end_node: graph.node_pos[to.index()],
            path_coordinates,
            segments,
            total_distance_m,
            estimated_time_min,
            average_congestion_factor,
            snapshot_timestamp: snapshot.timestamp,
        }
    }
}

fn identical(start: &Location, end: &Location) -> RouteError {
    RouteError::InvalidRequest(format!(
        "start {:?} and end {:?} resolve to the same intersection",
        start.label, end.label
    ))
}

/// One-shot convenience wrapper around [`RoutePlanner::find_route`].
pub fn find_route(
    start_label: &str,
    end_label:   &str,
    snapshot:    &Snapshot,
    locations:   &LocationRegistry,
    params:      &RoutingParams,
) -> PlanResult<RouteResult> {
    RoutePlanner::new(locations.clone(), params.clone()).find_route(start_label, end_label, snapshot)
}
