//! `ct-analysis` — models fitted on a traffic snapshot.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`classifier`] | `CongestionClassifier` (1-D k-means, threshold fallback)     |
//! | [`anomaly`]    | `AnomalyDetector`, `IsolationForest`, `Severity`             |
//! | [`stats`]      | `TrafficStats`, `compute_stats`                              |
//! | [`error`]      | `AnalysisError`, `AnalysisResult<T>`                         |
//!
//! Both models are refitted on every call against the snapshot they are
//! given, with a fixed seed, so the same snapshot always yields the same
//! output.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                |
//! |------------|-------------------------------------------------------|
//! | `parallel` | Grow isolation trees on the Rayon thread pool         |

pub mod anomaly;
pub mod classifier;
pub mod error;
pub mod stats;

#[cfg(test)]
mod tests;

pub use anomaly::{Anomaly, AnomalyDetector, AnomalyReport, IsolationForest, Severity};
pub use classifier::{
    Classification, ClassificationMethod, ClassifiedSegment, CongestionClassifier, KMeansFit, kmeans_1d,
};
pub use error::{AnalysisError, AnalysisResult};
pub use stats::{LevelCounts, RoadTypeStats, TrafficStats, TrendPoint, compute_stats};
