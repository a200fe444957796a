//! Traffic simulator: turns the road catalog into a randomised snapshot.
//!
//! For each road, per tick:
//!
//! ```text
//! volume  = uniform(base_volume(type)) × time_multiplier × speed × uniform(0.7, 1.3)
//! score   = min(100, volume / capacity(type) × 100)
//! spike?  (p = spike_probability)  score ×= uniform(1.5, 2.0); volume ×= uniform(1.5, 2.0)
//! ```
//!
//! The shape (which roads, which endpoints, how volume tracks the clock) is
//! fixed; only the values are random.  The same seed and timestamp always
//! produce the same snapshot.

use tracing::debug;

use ct_core::{ClockTime, SimRng, SimulationParams};

use crate::road::Road;
use crate::segment::{RoadSegment, Snapshot};

/// Owns the road catalog and simulation parameters.
#[derive(Clone, Debug)]
pub struct TrafficSimulator {
    roads:  Vec<Road>,
    params: SimulationParams,
}

impl TrafficSimulator {
    pub fn new(roads: Vec<Road>, params: SimulationParams) -> Self {
        Self { roads, params }
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn generate_snapshot(&self, timestamp: i64, rng: &mut SimRng) -> Snapshot {
        generate_snapshot(timestamp, &self.roads, &self.params, rng)
    }
}

/// Generate one snapshot for `timestamp`.  Never fails.
pub fn generate_snapshot(
    timestamp: i64,
    roads:     &[Road],
    params:    &SimulationParams,
    rng:       &mut SimRng,
) -> Snapshot {
    let clock = ClockTime::from_unix_secs(timestamp);
    let multiplier = clock.volume_multiplier() * params.simulation_speed.max(0.0);

    let segments = roads
        .iter()
        .map(|road| simulate_road(road, multiplier, params, rng))
        .collect::<Vec<_>>();

    debug!(%clock, multiplier, segments = segments.len(), "generated snapshot");
    Snapshot::new(timestamp, segments)
}

fn simulate_road(
    road:       &Road,
    multiplier: f64,
    params:     &SimulationParams,
    rng:        &mut SimRng,
) -> RoadSegment {
    let (lo, hi) = road.road_type.base_volume();
    let base = rng.gen_range(lo..=hi) as f64;
    let jitter = rng.gen_range(0.7..=1.3);
    let mut vehicles = clamp_count(base * multiplier * jitter);

    let capacity = road.road_type.capacity() as f64;
    let mut score = (vehicles as f64 / capacity * 100.0).min(100.0);

    if rng.gen_bool(params.spike_probability) {
        score = (score * rng.gen_range(1.5..=2.0)).min(100.0);
        vehicles = clamp_count(vehicles as f64 * rng.gen_range(1.5..=2.0));
        debug!(road = %road.id, vehicles, score, "traffic spike");
    }

    let score = round2(score).clamp(0.0, 100.0);

    RoadSegment {
        road_id:          road.id.clone(),
        road_name:        road.name.clone(),
        road_type:        road.road_type,
        start:            road.start,
        end:              road.end,
        vehicle_count:    vehicles,
        congestion_score: score,
        congestion_level: params.thresholds.level(score),
    }
}

/// Truncate to a non-negative integer count.
#[inline]
fn clamp_count(x: f64) -> u32 {
    if x.is_finite() && x > 0.0 { x.min(u32::MAX as f64) as u32 } else { 0 }
}

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
