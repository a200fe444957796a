//! Congestion classifier.
//!
//! # Algorithm
//!
//! One-dimensional k-means over the snapshot's congestion scores:
//!
//! ```text
//! for restart in 0..n_init:
//!     centres ← k-means++ seeding (child RNG per restart)
//!     repeat Lloyd steps until assignments stop changing or max_iter
//! keep the run with the lowest inertia (first run wins ties)
//! sort centres ascending; cluster rank r → CongestionLevel::ALL[r·3/k]
//! ```
//!
//! When there are fewer samples, or fewer distinct scores, than clusters the
//! classifier falls back to the fixed [`CongestionThresholds`] bands.

use serde::Serialize;
use tracing::{debug, warn};

use ct_core::{ClusterId, ClusteringParams, CongestionLevel, CongestionThresholds, SimRng};
use ct_sim::{RoadSegment, Snapshot};

use crate::error::AnalysisResult;

// ── Output types ──────────────────────────────────────────────────────────────

/// How a classification was produced.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    #[serde(rename = "kmeans")]
    KMeans,
    Threshold,
}

impl ClassificationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationMethod::KMeans => "kmeans",
            ClassificationMethod::Threshold => "threshold",
        }
    }
}

/// A segment together with its classified level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassifiedSegment {
    #[serde(flatten)]
    pub segment: RoadSegment,
    pub classified_level: CongestionLevel,
    pub cluster_id: ClusterId,
    pub method: ClassificationMethod,
}

/// Classification of one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Classification {
    pub method: ClassificationMethod,
    /// Cluster centres in ascending order; empty for the threshold fallback.
    pub centers: Vec<f64>,
    /// Sum of squared distances to the assigned centre (k-means only).
    pub inertia: Option<f64>,
    pub segments: Vec<ClassifiedSegment>,
}

impl Classification {
    pub fn empty() -> Self {
        Self { method: ClassificationMethod::Threshold, centers: Vec::new(), inertia: None, segments: Vec::new() }
    }

    /// Number of segments per level, in `CongestionLevel::ALL` order.
    pub fn level_counts(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for s in &self.segments {
            counts[s.classified_level as usize] += 1;
        }
        counts
    }
}

// ── CongestionClassifier ──────────────────────────────────────────────────────

/// Stateless classifier; every call refits on the given snapshot.
#[derive(Clone, Debug)]
pub struct CongestionClassifier {
    params:     ClusteringParams,
    thresholds: CongestionThresholds,
}

impl CongestionClassifier {
    pub fn new(params: ClusteringParams, thresholds: CongestionThresholds) -> AnalysisResult<Self> {
        params.validate()?;
        thresholds.validate()?;
        Ok(Self { params, thresholds })
    }

    pub fn params(&self) -> &ClusteringParams {
        &self.params
    }

    pub fn thresholds(&self) -> &CongestionThresholds {
        &self.thresholds
    }

    /// Classify every segment of `snapshot`.
    pub fn classify(&self, snapshot: &Snapshot) -> Classification {
        if snapshot.is_empty() {
            return Classification::empty();
        }

        let scores: Vec<f64> = snapshot.segments.iter().map(|s| s.congestion_score).collect();
        let k = self.params.n_clusters;

        if scores.len() < k || distinct_count(&scores) < k {
            warn!(
                samples = scores.len(),
                clusters = k,
                "not enough distinct scores for k-means; using threshold bands"
            );
            return self.classify_by_threshold(snapshot);
        }

        let mut rng = SimRng::new(self.params.seed);
        let fit = kmeans_1d(&scores, &self.params, &mut rng);
        debug!(centers = ?fit.centers, inertia = fit.inertia, "k-means fitted");

        let segments = snapshot
            .segments
            .iter()
            .zip(&fit.labels)
            .map(|(seg, &label)| ClassifiedSegment {
                segment: seg.clone(),
                classified_level: rank_to_level(label, k),
                cluster_id: ClusterId::try_from(label).unwrap_or_default(),
                method: ClassificationMethod::KMeans,
            })
            .collect();

        Classification {
            method: ClassificationMethod::KMeans,
            centers: fit.centers,
            inertia: Some(fit.inertia),
            segments,
        }
    }

    fn classify_by_threshold(&self, snapshot: &Snapshot) -> Classification {
        let segments = snapshot
            .segments
            .iter()
            .map(|seg| {
                let level = self.thresholds.level(seg.congestion_score);
                ClassifiedSegment {
                    segment: seg.clone(),
                    classified_level: level,
                    cluster_id: ClusterId(level as u8),
                    method: ClassificationMethod::Threshold,
                }
            })
            .collect();

        Classification { method: ClassificationMethod::Threshold, centers: Vec::new(), inertia: None, segments }
    }
}

/// Map a sorted cluster rank onto the three levels.
fn rank_to_level(rank: usize, k: usize) -> CongestionLevel {
    let idx = (rank * CongestionLevel::ALL.len() / k.max(1)).min(CongestionLevel::ALL.len() - 1);
    CongestionLevel::ALL[idx]
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

// ── k-means ───────────────────────────────────────────────────────────────────

/// Result of [`kmeans_1d`].  `labels[i]` is the rank of the centre assigned
/// to `values[i]` in the ascending `centers`.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansFit {
    pub centers: Vec<f64>,
    pub labels: Vec<usize>,
    pub inertia: f64,
}

/// Best-of-`n_init` Lloyd k-means on scalar values.
///
/// Callers must ensure `values` has at least `n_clusters` distinct entries.
pub fn kmeans_1d(values: &[f64], params: &ClusteringParams, rng: &mut SimRng) -> KMeansFit {
    let k = params.n_clusters;
    let mut best: Option<(Vec<f64>, Vec<usize>, f64)> = None;

    for restart in 0..params.n_init {
        let mut run_rng = rng.child(restart as u64);
        let mut centers = kmeans_plus_plus(values, k, &mut run_rng);
        let labels = lloyd(values, &mut centers, params.max_iter);
        let inertia = inertia(values, &centers, &labels);

        if best.as_ref().is_none_or(|(_, _, b)| inertia < *b) {
            best = Some((centers, labels, inertia));
        }
    }

    let (centers, labels, inertia) = best.unwrap_or_default();

    // Renumber clusters by ascending centre.
    let mut order: Vec<usize> = (0..centers.len()).collect();
    order.sort_by(|&a, &b| centers[a].total_cmp(&centers[b]));
    let mut rank = vec![0usize; centers.len()];
    for (r, &c) in order.iter().enumerate() {
        rank[c] = r;
    }

    KMeansFit {
        centers: order.iter().map(|&c| centers[c]).collect(),
        labels: labels.iter().map(|&l| rank[l]).collect(),
        inertia,
    }
}

fn kmeans_plus_plus(values: &[f64], k: usize, rng: &mut SimRng) -> Vec<f64> {
    let mut centers = Vec::with_capacity(k);
    centers.push(values[rng.gen_range(0..values.len())]);

    let mut d2: Vec<f64> = values.iter().map(|&v| (v - centers[0]).powi(2)).collect();
    while centers.len() < k {
        let total: f64 = d2.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            let mut pick = values.len() - 1;
            for (i, &w) in d2.iter().enumerate() {
                if target < w {
                    pick = i;
                    break;
                }
                target -= w;
            }
            pick
        } else {
            rng.gen_range(0..values.len())
        };

        let c = values[next];
        centers.push(c);
        for (d, &v) in d2.iter_mut().zip(values) {
            *d = d.min((v - c).powi(2));
        }
    }
    centers
}

/// Lloyd iterations; updates `centers` in place and returns assignments.
/// A cluster that loses all its points keeps its previous centre.
fn lloyd(values: &[f64], centers: &mut [f64], max_iter: usize) -> Vec<usize> {
    let mut labels = assign(values, centers);
    for _ in 0..max_iter {
        let mut sums = vec![0.0; centers.len()];
        let mut counts = vec![0usize; centers.len()];
        for (&v, &l) in values.iter().zip(&labels) {
            sums[l] += v;
            counts[l] += 1;
        }
        for (c, (s, n)) in centers.iter_mut().zip(sums.iter().zip(&counts)) {
            if *n > 0 {
                *c = s / *n as f64;
            }
        }

        let next = assign(values, centers);
        if next == labels {
            break;
        }
        labels = next;
    }
    labels
}

/// Nearest centre per value; ties go to the lower index.
fn assign(values: &[f64], centers: &[f64]) -> Vec<usize> {
    values
        .iter()
        .map(|&v| {
            let mut best = 0;
            for (i, &c) in centers.iter().enumerate().skip(1) {
                if (v - c).abs() < (v - centers[best]).abs() {
                    best = i;
                }
            }
            best
        })
        .collect()
}

fn inertia(values: &[f64], centers: &[f64], labels: &[usize]) -> f64 {
    values.iter().zip(labels).map(|(&v, &l)| (v - centers[l]).powi(2)).sum()
}
