//! Aggregate traffic statistics.

use std::sync::Arc;

use serde::Serialize;

use ct_core::CongestionLevel;
use ct_sim::{RoadType, Snapshot};

use crate::classifier::Classification;

/// Snapshots included in the historical trend.
pub const TREND_WINDOW: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurrentStats {
    pub total_vehicles: u64,
    pub average_congestion: f64,
    pub total_roads: usize,
    pub timestamp: i64,
}

/// Segment count per classified level.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelCounts {
    #[serde(rename = "Low")]
    pub low: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "High")]
    pub high: usize,
}

impl LevelCounts {
    pub fn get(&self, level: CongestionLevel) -> usize {
        match level {
            CongestionLevel::Low => self.low,
            CongestionLevel::Medium => self.medium,
            CongestionLevel::High => self.high,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoadTypeStats {
    pub road_type: RoadType,
    pub count: usize,
    pub total_vehicles: u64,
    pub average_congestion: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: i64,
    pub total_vehicles: u64,
    pub average_congestion: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrafficStats {
    pub current: CurrentStats,
    pub congestion_distribution: LevelCounts,
    /// One entry per road type present in the snapshot, in `RoadType::ALL`
    /// order.
    pub road_type_stats: Vec<RoadTypeStats>,
    /// Oldest first.
    pub historical_trend: Vec<TrendPoint>,
    pub anomaly_count: usize,
}

/// Summarise `snapshot`.
///
/// `history` is the provider's recent snapshots, oldest first; only the last
/// [`TREND_WINDOW`] are used.  The level distribution comes from
/// `classification` rather than the segments' own threshold labels.
pub fn compute_stats(
    snapshot:       &Snapshot,
    history:        &[Arc<Snapshot>],
    classification: &Classification,
    anomaly_count:  usize,
) -> TrafficStats {
    let [low, medium, high] = classification.level_counts();

    let road_type_stats = RoadType::ALL
        .iter()
        .filter_map(|&road_type| {
            let (count, total_vehicles, score_sum) = snapshot
                .segments
                .iter()
                .filter(|s| s.road_type == road_type)
                .fold((0usize, 0u64, 0.0f64), |(c, v, s), seg| {
                    (c + 1, v + seg.vehicle_count as u64, s + seg.congestion_score)
                });
            (count > 0).then(|| RoadTypeStats {
                road_type,
                count,
                total_vehicles,
                average_congestion: round2(score_sum / count as f64),
            })
        })
        .collect();

    let skip = history.len().saturating_sub(TREND_WINDOW);
    let historical_trend = history[skip..]
        .iter()
        .map(|s| TrendPoint {
            timestamp: s.timestamp,
            total_vehicles: s.total_vehicles(),
            average_congestion: round2(s.average_congestion()),
        })
        .collect();

    TrafficStats {
        current: CurrentStats {
            total_vehicles: snapshot.total_vehicles(),
            average_congestion: round2(snapshot.average_congestion()),
            total_roads: snapshot.len(),
            timestamp: snapshot.timestamp,
        },
        congestion_distribution: LevelCounts { low, medium, high },
        road_type_stats,
        historical_trend,
        anomaly_count,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
