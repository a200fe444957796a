//! `ct-spatial` — traffic graph, named locations, and route planning.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`network`]   | `TrafficGraph` (CSR + R-tree), `TrafficGraphBuilder`          |
//! | [`router`]    | `Router` trait, `Path`, `DijkstraRouter`                      |
//! | [`locations`] | `Location`, `LocationRegistry` (label → coordinate)          |
//! | [`planner`]   | `RoutePlanner`, `find_route`, `RouteResult`, `RouteSegment`   |
//! | [`error`]     | `RouteError`, `RouteErrorKind`, `PlanResult<T>`               |
//!
//! # Query pipeline
//!
//! ```text
//! find_route("A", "D", &snapshot)
//!   ① resolve labels        LocationRegistry   (unknown → NotFound, same → InvalidRequest)
//!   ② build graph           TrafficGraph::from_snapshot   (fresh every query)
//!   ③ snap to nodes         R-tree nearest within tolerance
//!   ④ shortest path         DijkstraRouter over congestion weights
//!   ⑤ metrics               distance, travel time, per-segment breakdown
//! ```

pub mod error;
pub mod locations;
pub mod network;
pub mod planner;
pub mod router;


pub use error::{PlanResult, RouteError, RouteErrorKind};
pub use locations::{Location, LocationRegistry};
pub use network::{TrafficGraph, TrafficGraphBuilder};
pub use planner::{RoutePlanner, RouteResult, RouteSegment, find_route};
pub use router::{DijkstraRouter, Path, Router};
