//! Named routing endpoints.

use serde::Serialize;

use ct_core::GeoPoint;

use crate::error::{PlanResult, RouteError};

/// A label users can pass as a route start or end.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Location {
    pub label: String,
    pub point: GeoPoint,
}

impl Location {
    pub fn new(label: &str, point: GeoPoint) -> Self {
        Self { label: label.to_string(), point }
    }
}

/// Static label → coordinate mapping.  Lookups are case-insensitive and
/// ignore surrounding whitespace.
#[derive(Clone, Debug, Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// The four lettered intersections plus the arterial junction names,
    /// placed relative to `center`.
    pub fn standard(center: GeoPoint) -> Self {
        let p = |d_lat: f64, d_lon: f64| center.offset(d_lat, d_lon);
        Self::new(vec![
            Location::new("A", p(0.000, 0.000)),
            Location::new("B", p(0.005, 0.005)),
            Location::new("C", p(0.002, 0.002)),
            Location::new("D", p(0.004, 0.006)),
            Location::new("Main Street", p(0.000, 0.000)),
            Location::new("Broadway", p(0.001, 0.001)),
            Location::new("Park Avenue", p(0.002, 0.002)),
            Location::new("5th Avenue", p(0.003, 0.003)),
            Location::new("Madison Ave", p(0.004, 0.004)),
        ])
    }

    /// Resolve a user-supplied label.
    pub fn resolve(&self, label: &str) -> PlanResult<&Location> {
        let wanted = label.trim();
        if wanted.is_empty() {
            return Err(RouteError::InvalidRequest("location label must not be empty".into()));
        }
        self.locations
            .iter()
            .find(|l| l.label.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RouteError::UnknownLocation(wanted.to_string()))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> + '_ {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
