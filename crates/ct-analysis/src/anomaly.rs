//! Isolation-forest anomaly detector.
//!
//! # Scoring
//!
//! Each segment becomes the feature vector `[vehicle_count, congestion_score]`.
//! A forest of random isolation trees is grown on sub-samples of those
//! vectors; a point's anomaly score is
//!
//! ```text
//! s(x) = 2^( −E[h(x)] / c(ψ) )
//! ```
//!
//! where `h(x)` is the path length in one tree, `ψ` the sub-sample size and
//! `c(ψ)` the average path length of an unsuccessful BST search.  Scores lie
//! in (0, 1]; higher means easier to isolate.
//!
//! # Flagging
//!
//! The cut-off is the `(1 − contamination)` percentile of the sample's scores
//! (linear interpolation).  Points strictly above it are flagged, at most
//! `ceil(contamination · n)` of them, highest scores first.

use serde::Serialize;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use ct_core::{AnomalyParams, SimRng};
use ct_sim::{RoadSegment, Snapshot};

use crate::error::AnalysisResult;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
const N_FEATURES: usize = 2;

type Sample = [f64; N_FEATURES];

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severity from how far `score` sits above the cut-off.
    pub fn from_excess(excess: f64) -> Self {
        if excess >= 0.10 {
            Severity::High
        } else if excess >= 0.05 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Anomaly {
    #[serde(flatten)]
    pub segment: RoadSegment,
    pub anomaly_score: f64,
    pub severity: Severity,
}

/// Detection result for one snapshot.  `anomalies` is ordered by descending
/// score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
    /// Score cut-off; `None` when the sample was too small to fit.
    pub threshold: Option<f64>,
    pub samples: usize,
    pub contamination: f64,
}

// ── AnomalyDetector ───────────────────────────────────────────────────────────

/// Fits a fresh forest on each snapshot and flags its outliers.
#[derive(Clone, Debug)]
pub struct AnomalyDetector {
    params: AnomalyParams,
}

impl AnomalyDetector {
    pub fn new(params: AnomalyParams) -> AnalysisResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &AnomalyParams {
        &self.params
    }

    /// Largest number of segments `detect` may flag for a sample of `n`.
    pub fn max_flagged(&self, n: usize) -> usize {
        // The epsilon keeps e.g. 0.1 × 30 from rounding up to 4.
        ((self.params.contamination * n as f64) - 1e-9).ceil().max(0.0) as usize
    }

    pub fn detect(&self, snapshot: &Snapshot) -> AnomalyReport {
        let n = snapshot.len();
        let contamination = self.params.contamination;
        if n < 2 {
            return AnomalyReport { anomalies: Vec::new(), threshold: None, samples: n, contamination };
        }

        let data: Vec<Sample> = snapshot
            .segments
            .iter()
            .map(|s| [s.vehicle_count as f64, s.congestion_score])
            .collect();

        let mut rng = SimRng::new(self.params.seed);
        let forest = IsolationForest::fit(&data, &self.params, &mut rng);
        let scores: Vec<f64> = data.iter().map(|x| forest.score(x)).collect();
        let threshold = percentile(&scores, 1.0 - contamination);

        let mut flagged: Vec<usize> = (0..n).filter(|&i| scores[i] > threshold).collect();
        flagged.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
        flagged.truncate(self.max_flagged(n));

        debug!(samples = n, threshold, flagged = flagged.len(), "anomaly detection finished");

        let anomalies = flagged
            .into_iter()
            .map(|i| Anomaly {
                segment: snapshot.segments[i].clone(),
                anomaly_score: scores[i],
                severity: Severity::from_excess(scores[i] - threshold),
            })
            .collect();

        AnomalyReport { anomalies, threshold: Some(threshold), samples: n, contamination }
    }
}

/// `q`-quantile (`q` in [0, 1]) with linear interpolation between order
/// statistics.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ── IsolationForest ───────────────────────────────────────────────────────────

/// Average path length of an unsuccessful search in a BST of `n` points.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

pub struct IsolationForest {
    trees:       Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Grow `params.n_trees` trees.  Every tree's RNG is derived from `rng`
    /// up front, in tree order, so the serial and parallel builds agree.
    pub fn fit(data: &[Sample], params: &AnomalyParams, rng: &mut SimRng) -> Self {
        let sample_size = params.max_samples.min(data.len());
        let height_limit = (sample_size.max(2) as f64).log2().ceil() as usize;
        let tree_rngs: Vec<SimRng> = (0..params.n_trees).map(|i| rng.child(i as u64)).collect();

        let grow = |mut tree_rng: SimRng| {
            let idx = tree_rng.sample_indices(data.len(), sample_size);
            IsolationTree::grow(data, idx, height_limit, &mut tree_rng)
        };

        #[cfg(feature = "parallel")]
        let trees = tree_rngs.into_par_iter().map(grow).collect();
        #[cfg(not(feature = "parallel"))]
        let trees = tree_rngs.into_iter().map(grow).collect();

        Self { trees, sample_size }
    }

    /// Anomaly score in (0, 1].
    pub fn score(&self, x: &Sample) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let mean_path: f64 =
            self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let c = average_path_length(self.sample_size);
        if c == 0.0 {
            return 0.5;
        }
        2f64.powf(-mean_path / c)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

enum TreeNode {
    Leaf { size: usize },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// Arena-allocated isolation tree; node 0 is the root.
struct IsolationTree {
    nodes: Vec<TreeNode>,
}

impl IsolationTree {
    fn grow(data: &[Sample], idx: Vec<usize>, height_limit: usize, rng: &mut SimRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.split(data, idx, 0, height_limit, rng);
        tree
    }

    /// Build the subtree over `idx` and return its node index.
    fn split(&mut self, data: &[Sample], idx: Vec<usize>, depth: usize, limit: usize, rng: &mut SimRng) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { size: idx.len() });
        if depth >= limit || idx.len() <= 1 {
            return slot;
        }

        // Features that still vary within this node.
        let mut candidates: Vec<(usize, f64, f64)> = Vec::with_capacity(N_FEATURES);
        for f in 0..N_FEATURES {
            let (lo, hi) = idx.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(data[i][f]), hi.max(data[i][f]))
            });
            if hi > lo {
                candidates.push((f, lo, hi));
            }
        }
        if candidates.is_empty() {
            return slot;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(lo..hi);
        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            idx.into_iter().partition(|&i| data[i][feature] < threshold);

        let left = self.split(data, left_idx, depth + 1, limit, rng);
        let right = self.split(data, right_idx, depth + 1, limit, rng);
        self.nodes[slot] = TreeNode::Split { feature, threshold, left, right };
        slot
    }

    fn path_length(&self, x: &Sample) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[node] {
                TreeNode::Leaf { size } => return depth + average_path_length(size),
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if x[feature] < threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}
