//! Parameter structs for each subsystem.
//!
//! Defaults reproduce the constants the system has always run with.  The
//! server crate fills these from CLI flags / environment variables and calls
//! `validate()` once at startup; library code assumes validated values.

use crate::{CongestionThresholds, CtError, CtResult, GeoPoint};

/// Default map centre (lower Manhattan).
pub const DEFAULT_MAP_CENTER: GeoPoint = GeoPoint { lat: 40.7128, lon: -74.0060 };

// ── Simulation ────────────────────────────────────────────────────────────────

/// Knobs for the traffic simulator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationParams {
    /// Global volume scale on top of the time-of-day multiplier.
    pub simulation_speed: f64,
    /// Per-segment probability of an anomalous spike each tick.
    pub spike_probability: f64,
    /// Bands used to label each segment's score.
    pub thresholds: CongestionThresholds,
    /// Centre of the built-in road grid and of the named locations.
    pub map_center: GeoPoint,
}

impl SimulationParams {
    pub fn validate(&self) -> CtResult<()> {
        if !(self.simulation_speed.is_finite() && self.simulation_speed >= 0.0) {
            return Err(CtError::Config(format!(
                "simulation speed must be finite and >= 0, got {}",
                self.simulation_speed
            )));
        }
        if !(0.0..=1.0).contains(&self.spike_probability) {
            return Err(CtError::Config(format!(
                "spike probability must be in [0, 1], got {}",
                self.spike_probability
            )));
        }
        if !self.map_center.is_valid() {
            return Err(CtError::Config(format!("map centre {} is out of range", self.map_center)));
        }
        self.thresholds.validate()
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            simulation_speed: 1.0,
            spike_probability: 0.05,
            thresholds: CongestionThresholds::default(),
            map_center: DEFAULT_MAP_CENTER,
        }
    }
}

// ── Clustering ────────────────────────────────────────────────────────────────

/// Upper bound on `n_clusters`: every cluster rank must fit a `ClusterId`
/// below `ClusterId::INVALID`.
pub const MAX_CLUSTERS: usize = u8::MAX as usize;

/// K-means parameters for the congestion classifier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusteringParams {
    pub n_clusters: usize,
    pub seed: u64,
    /// Independent k-means++ restarts; the lowest-inertia run wins.
    pub n_init: usize,
    pub max_iter: usize,
}

impl ClusteringParams {
    pub fn validate(&self) -> CtResult<()> {
        if self.n_clusters == 0 || self.n_init == 0 || self.max_iter == 0 {
            return Err(CtError::Config(
                "clustering n_clusters, n_init and max_iter must all be >= 1".into(),
            ));
        }
        if self.n_clusters > MAX_CLUSTERS {
            return Err(CtError::Config(format!(
                "clustering n_clusters must be <= {MAX_CLUSTERS}, got {}",
                self.n_clusters
            )));
        }
        Ok(())
    }
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self { n_clusters: 3, seed: 42, n_init: 10, max_iter: 300 }
    }
}

// ── Anomaly detection ─────────────────────────────────────────────────────────

/// Isolation-forest parameters for the anomaly detector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnomalyParams {
    /// Expected outlier fraction, in (0, 0.5].
    pub contamination: f64,
    pub seed: u64,
    pub n_trees: usize,
    /// Sub-sample size per tree (capped at the sample count).
    pub max_samples: usize,
}

impl AnomalyParams {
    pub fn validate(&self) -> CtResult<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(CtError::Config(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.n_trees == 0 || self.max_samples < 2 {
            return Err(CtError::Config(
                "anomaly detector needs n_trees >= 1 and max_samples >= 2".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AnomalyParams {
    fn default() -> Self {
        Self { contamination: 0.1, seed: 42, n_trees: 100, max_samples: 256 }
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

/// Edge-weight and travel-time parameters for the route planner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingParams {
    /// Weight = distance × (1 + score/100 × penalty).
    pub congestion_penalty_factor: f64,
    /// Free-flow speed used for travel-time estimates.
    pub average_speed_kmh: f64,
    /// Max distance between a named location and the graph node it snaps to.
    pub snap_tolerance_m: f64,
}

impl RoutingParams {
    pub fn validate(&self) -> CtResult<()> {
        if !(self.congestion_penalty_factor.is_finite() && self.congestion_penalty_factor >= 0.0) {
            return Err(CtError::Config(format!(
                "congestion penalty factor must be finite and >= 0, got {}",
                self.congestion_penalty_factor
            )));
        }
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(CtError::Config(format!(
                "average speed must be finite and > 0, got {}",
                self.average_speed_kmh
            )));
        }
        if !(self.snap_tolerance_m.is_finite() && self.snap_tolerance_m >= 0.0) {
            return Err(CtError::Config("snap tolerance must be finite and >= 0".into()));
        }
        Ok(())
    }

    /// Average speed in metres per minute.
    #[inline]
    pub fn speed_m_per_min(&self) -> f64 {
        self.average_speed_kmh * 1000.0 / 60.0
    }
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self { congestion_penalty_factor: 2.0, average_speed_kmh: 60.0, snap_tolerance_m: 25.0 }
    }
}
