//! Congestion levels and the fixed threshold bands that derive them.

use std::fmt;

use crate::{CtError, CtResult};

/// Three-way congestion label.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

impl CongestionLevel {
    /// Levels in ascending order.  Cluster `i` (after sorting centres) maps
    /// to `ALL[i]`.
    pub const ALL: [CongestionLevel; 3] =
        [CongestionLevel::Low, CongestionLevel::Medium, CongestionLevel::High];

    pub fn as_str(self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low",
            CongestionLevel::Medium => "Medium",
            CongestionLevel::High => "High",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score bands: `[0, low_max)` Low, `[low_max, medium_max)` Medium, rest High.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CongestionThresholds {
    pub low_max: f64,
    pub medium_max: f64,
}

impl CongestionThresholds {
    pub fn new(low_max: f64, medium_max: f64) -> CtResult<Self> {
        let t = Self { low_max, medium_max };
        t.validate()?;
        Ok(t)
    }

    pub fn validate(&self) -> CtResult<()> {
        let ordered = 0.0 <= self.low_max
            && self.low_max <= self.medium_max
            && self.medium_max <= 100.0;
        if !ordered {
            return Err(CtError::Config(format!(
                "congestion thresholds must satisfy 0 <= low ({}) <= medium ({}) <= 100",
                self.low_max, self.medium_max
            )));
        }
        Ok(())
    }

    pub fn level(&self, score: f64) -> CongestionLevel {
        if score < self.low_max {
            CongestionLevel::Low
        } else if score < self.medium_max {
            CongestionLevel::Medium
        } else {
            CongestionLevel::High
        }
    }
}

impl Default for CongestionThresholds {
    fn default() -> Self {
        Self { low_max: 30.0, medium_max: 70.0 }
    }
}
