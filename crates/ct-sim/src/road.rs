//! Road catalog: the static description of the simulated network.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ct_core::GeoPoint;

// ── RoadType ──────────────────────────────────────────────────────────────────

/// Functional class of a road.  Determines simulated volume and capacity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadType {
    Arterial,
    Collector,
    Local,
}

impl RoadType {
    pub const ALL: [RoadType; 3] = [RoadType::Arterial, RoadType::Collector, RoadType::Local];

    /// Inclusive range of the base vehicle count before time-of-day scaling.
    pub fn base_volume(self) -> (u32, u32) {
        match self {
            RoadType::Arterial => (50, 150),
            RoadType::Collector => (20, 80),
            RoadType::Local => (5, 40),
        }
    }

    /// Vehicle count at which the congestion score reaches 100.
    pub fn capacity(self) -> u32 {
        match self {
            RoadType::Arterial => 200,
            RoadType::Collector => 100,
            RoadType::Local => 50,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadType::Arterial => "arterial",
            RoadType::Collector => "collector",
            RoadType::Local => "local",
        }
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arterial" => Ok(RoadType::Arterial),
            "collector" => Ok(RoadType::Collector),
            "local" => Ok(RoadType::Local),
            other => Err(other.to_string()),
        }
    }
}

// ── Road ──────────────────────────────────────────────────────────────────────

/// One road of the catalog.  Each tick turns every `Road` into a
/// [`RoadSegment`](crate::RoadSegment) with fresh traffic values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: String,
    pub name: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub road_type: RoadType,
}

impl Road {
    pub fn new(id: &str, name: &str, start: GeoPoint, end: GeoPoint, road_type: RoadType) -> Self {
        Self { id: id.to_string(), name: name.to_string(), start, end, road_type }
    }

    /// Haversine length in metres.
    pub fn length_m(&self) -> f64 {
        self.start.distance_m(self.end)
    }
}

/// The built-in 15-road grid around `center`.
///
/// Five arterials run diagonally in 0.001° steps from the centre, five
/// collectors cross them eastwards, and five locals run north–south along the
/// eastern edge.
pub fn builtin_roads(center: GeoPoint) -> Vec<Road> {
    use RoadType::*;
    let p = |d_lat: f64, d_lon: f64| center.offset(d_lat, d_lon);

    vec![
        Road::new("R001", "Main Street",    p(0.000, 0.000), p(0.001, 0.001), Arterial),
        Road::new("R002", "Broadway",       p(0.001, 0.001), p(0.002, 0.002), Arterial),
        Road::new("R003", "Park Avenue",    p(0.002, 0.002), p(0.003, 0.003), Arterial),
        Road::new("R004", "5th Avenue",     p(0.003, 0.003), p(0.004, 0.004), Arterial),
        Road::new("R005", "Madison Ave",    p(0.004, 0.004), p(0.005, 0.005), Arterial),
        Road::new("R006", "42nd Street",    p(0.000, 0.000), p(0.000, 0.006), Collector),
        Road::new("R007", "34th Street",    p(0.001, 0.001), p(0.001, 0.005), Collector),
        Road::new("R008", "23rd Street",    p(0.002, 0.002), p(0.002, 0.006), Collector),
        Road::new("R009", "14th Street",    p(0.003, 0.003), p(0.003, 0.005), Collector),
        Road::new("R010", "Houston St",     p(0.004, 0.004), p(0.004, 0.006), Collector),
        Road::new("R011", "1st Avenue",     p(0.000, 0.006), p(0.005, 0.006), Local),
        Road::new("R012", "2nd Avenue",     p(0.000, 0.005), p(0.005, 0.005), Local),
        Road::new("R013", "3rd Avenue",     p(0.000, 0.004), p(0.005, 0.004), Local),
        Road::new("R014", "Lexington Ave",  p(0.000, 0.003), p(0.005, 0.003), Local),
        Road::new("R015", "Park Ave South", p(0.000, 0.002), p(0.005, 0.002), Local),
    ]
}
