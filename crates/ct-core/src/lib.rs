//! `ct-core` — foundational types for the city traffic twin.
//!
//! This crate is a dependency of every other `ct-*` crate.  It has no `ct-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EdgeId`, `ClusterId`                            |
//! | [`geo`]     | `GeoPoint`, haversine distance, 4-decimal grid keys        |
//! | [`time`]    | `ClockTime`, `DayPeriod`, traffic-volume multiplier         |
//! | [`rng`]     | `SimRng` (seeded, reproducible)                            |
//! | [`config`]  | Parameter structs for every subsystem, with defaults       |
//! | [`level`]   | `CongestionLevel`, `CongestionThresholds`                  |
//! | [`error`]   | `CtError`, `CtResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod level;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AnomalyParams, ClusteringParams, RoutingParams, SimulationParams};
pub use error::{CtError, CtResult};
pub use geo::GeoPoint;
pub use ids::{ClusterId, EdgeId, NodeId};
pub use level::{CongestionLevel, CongestionThresholds};
pub use rng::SimRng;
pub use time::{ClockTime, DayPeriod};
