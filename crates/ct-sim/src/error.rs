//! Simulation-subsystem error type.

use thiserror::Error;

/// Errors produced by `ct-sim`.
///
/// Snapshot generation itself never fails; these come from loading a road
/// catalog.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("road {id}: unknown road type {value:?} (expected arterial, collector or local)")]
    UnknownRoadType { id: String, value: String },

    #[error("road {id}: coordinate out of range")]
    InvalidCoordinate { id: String },

    #[error("duplicate road id {0}")]
    DuplicateRoad(String),
}

pub type SimResult<T> = Result<T, SimError>;
