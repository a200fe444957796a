//! CSV road-catalog loader.
//!
//! # CSV format
//!
//! One row per road, coordinates in decimal degrees:
//!
//! ```csv
//! id,name,start_lat,start_lon,end_lat,end_lon,road_type
//! R001,Main Street,40.7128,-74.0060,40.7138,-74.0050,arterial
//! R006,42nd Street,40.7128,-74.0060,40.7128,-74.0000,collector
//! ```
//!
//! `road_type` is one of `arterial`, `collector`, `local` (case-insensitive).
//! Road ids must be unique.  Rows keep file order, which is also the order of
//! segments in every snapshot and hence of node ids in the traffic graph.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Deserialize;

use ct_core::GeoPoint;

use crate::error::{SimError, SimResult};
use crate::road::{Road, RoadType};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RoadRecord {
    id:        String,
    name:      String,
    start_lat: f64,
    start_lon: f64,
    end_lat:   f64,
    end_lon:   f64,
    road_type: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road catalog from a CSV file.
pub fn load_roads_csv(path: &Path) -> SimResult<Vec<Road>> {
    let file = std::fs::File::open(path)?;
    load_roads_reader(file)
}

/// Like [`load_roads_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_roads_reader<R: Read>(reader: R) -> SimResult<Vec<Road>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut roads = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for result in csv_reader.deserialize::<RoadRecord>() {
        let rec = result?;

        let road_type: RoadType = rec
            .road_type
            .parse()
            .map_err(|value| SimError::UnknownRoadType { id: rec.id.clone(), value })?;

        let start = GeoPoint::new(rec.start_lat, rec.start_lon);
        let end = GeoPoint::new(rec.end_lat, rec.end_lon);
        if !start.is_valid() || !end.is_valid() {
            return Err(SimError::InvalidCoordinate { id: rec.id });
        }

        if !seen.insert(rec.id.clone()) {
            return Err(SimError::DuplicateRoad(rec.id));
        }

        roads.push(Road { id: rec.id, name: rec.name, start, end, road_type });
    }

    Ok(roads)
}
