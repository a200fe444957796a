//! Per-tick traffic values.

use serde::{Deserialize, Serialize};

use ct_core::{CongestionLevel, GeoPoint};

use crate::road::RoadType;

/// One road's traffic state within a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub road_id: String,
    pub road_name: String,
    pub road_type: RoadType,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub vehicle_count: u32,
    /// 0–100, two decimals.
    pub congestion_score: f64,
    /// Threshold-band label of `congestion_score`.
    pub congestion_level: CongestionLevel,
}

/// One complete, immutable set of segments representing "now".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix seconds (UTC) the snapshot was generated for.
    pub timestamp: i64,
    pub segments: Vec<RoadSegment>,
}

impl Snapshot {
    pub fn new(timestamp: i64, segments: Vec<RoadSegment>) -> Self {
        Self { timestamp, segments }
    }

    pub fn empty(timestamp: i64) -> Self {
        Self { timestamp, segments: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, road_id: &str) -> Option<&RoadSegment> {
        self.segments.iter().find(|s| s.road_id == road_id)
    }

    pub fn total_vehicles(&self) -> u64 {
        self.segments.iter().map(|s| s.vehicle_count as u64).sum()
    }

    /// Mean congestion score, or 0 for an empty snapshot.
    pub fn average_congestion(&self) -> f64 {
        if self.segments.is_empty() {
            return 0.0;
        }
        self.segments.iter().map(|s| s.congestion_score).sum::<f64>() / self.segments.len() as f64
    }
}
