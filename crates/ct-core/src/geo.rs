//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Intersections are identified by
//! their coordinates rounded to 4 decimal places (~11 m), see
//! [`GeoPoint::grid_key`].

/// Decimal places used when keying intersections by coordinate.
pub const GRID_DECIMALS: i32 = 4;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// The point shifted by `(d_lat, d_lon)` degrees.
    #[inline]
    pub fn offset(self, d_lat: f64, d_lon: f64) -> Self {
        Self::new(self.lat + d_lat, self.lon + d_lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Integer key of the coordinate rounded to [`GRID_DECIMALS`] places.
    ///
    /// Two endpoints that print identically at 4 decimals share a key, so
    /// floating-point noise from offset arithmetic never splits an
    /// intersection in two.
    #[inline]
    pub fn grid_key(self) -> (i64, i64) {
        let scale = 10f64.powi(GRID_DECIMALS);
        ((self.lat * scale).round() as i64, (self.lon * scale).round() as i64)
    }

    /// The coordinate snapped to the [`GRID_DECIMALS`] grid.
    pub fn rounded(self) -> GeoPoint {
        let scale = 10f64.powi(GRID_DECIMALS);
        let (lat, lon) = self.grid_key();
        GeoPoint::new(lat as f64 / scale, lon as f64 / scale)
    }

    /// `true` if both components are within [-90, 90] / [-180, 180].
    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}
