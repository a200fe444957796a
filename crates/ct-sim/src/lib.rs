//! `ct-sim` — road catalog, traffic simulator, and snapshot providers.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`road`]      | `RoadType`, `Road`, the built-in 15-road grid             |
//! | [`loader`]    | CSV road-catalog loader                                   |
//! | [`segment`]   | `RoadSegment`, `Snapshot`                                 |
//! | [`simulator`] | `TrafficSimulator`, `generate_snapshot`                   |
//! | [`history`]   | `SnapshotHistory` (bounded ring of past snapshots)        |
//! | [`provider`]  | `SnapshotProvider` trait, `FixedSnapshot`, `LiveSnapshots` |
//! | [`error`]     | `SimError`, `SimResult<T>`                                |
//!
//! # Snapshot lifecycle
//!
//! ```text
//! LiveSnapshots::refresh(ts)
//!   ① generate_snapshot(ts, roads, params, rng)   (outside any lock)
//!   ② push Arc<Snapshot> into the bounded history
//!   ③ swap the Arc behind the RwLock               (readers see old or new, never a mix)
//! ```

pub mod error;
pub mod history;
pub mod loader;
pub mod provider;
pub mod road;
pub mod segment;
pub mod simulator;

#[cfg(test)]
mod tests;

pub use error::{SimError, SimResult};
pub use history::SnapshotHistory;
pub use loader::{load_roads_csv, load_roads_reader};
pub use provider::{FixedSnapshot, LiveSnapshots, SnapshotProvider};
pub use road::{Road, RoadType, builtin_roads};
pub use segment::{RoadSegment, Snapshot};
pub use simulator::{TrafficSimulator, generate_snapshot};
