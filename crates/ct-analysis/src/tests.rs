//! Unit tests for ct-analysis.

#[cfg(test)]
mod helpers {
    use ct_core::{CongestionThresholds, GeoPoint, SimRng, SimulationParams};
    use ct_sim::{RoadSegment, RoadType, Snapshot, TrafficSimulator, builtin_roads};

    pub const CENTER: GeoPoint = GeoPoint { lat: 40.7128, lon: -74.0060 };
    /// Tuesday 08:00 UTC.
    pub const RUSH: i64 = 1_699_948_800;

    pub fn segment(i: usize, road_type: RoadType, vehicles: u32, score: f64) -> RoadSegment {
        let start = CENTER.offset(i as f64 * 0.001, 0.0);
        RoadSegment {
            road_id: format!("R{i:03}"),
            road_name: format!("Road {i}"),
            road_type,
            start,
            end: start.offset(0.0, 0.001),
            vehicle_count: vehicles,
            congestion_score: score,
            congestion_level: CongestionThresholds::default().level(score),
        }
    }

    pub fn scores_snapshot(scores: &[f64]) -> Snapshot {
        let segments = scores
            .iter()
            .enumerate()
            .map(|(i, &s)| segment(i, RoadType::Collector, s as u32, s))
            .collect();
        Snapshot::new(RUSH, segments)
    }

    pub fn builtin_snapshot(seed: u64) -> Snapshot {
        TrafficSimulator::new(builtin_roads(CENTER), SimulationParams::default())
            .generate_snapshot(RUSH, &mut SimRng::new(seed))
    }
}

// ── Classifier ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod classifier {
    use ct_core::{ClusterId, ClusteringParams, CongestionLevel, CongestionThresholds, SimRng};
    use ct_sim::Snapshot;

    use crate::{ClassificationMethod, CongestionClassifier, kmeans_1d};

    use super::helpers::{RUSH, builtin_snapshot, scores_snapshot};

    fn classifier() -> CongestionClassifier {
        CongestionClassifier::new(ClusteringParams::default(), CongestionThresholds::default()).unwrap()
    }

    #[test]
    fn empty_snapshot_gives_empty_classification() {
        let c = classifier().classify(&Snapshot::empty(RUSH));
        assert!(c.segments.is_empty());
        assert_eq!(c.level_counts(), [0, 0, 0]);
    }

    #[test]
    fn too_few_samples_falls_back_to_thresholds() {
        let c = classifier().classify(&scores_snapshot(&[10.0, 80.0]));
        assert_eq!(c.method, ClassificationMethod::Threshold);
        assert!(c.centers.is_empty());
        let levels: Vec<_> = c.segments.iter().map(|s| s.classified_level).collect();
        assert_eq!(levels, vec![CongestionLevel::Low, CongestionLevel::High]);
        assert_eq!(c.segments[1].cluster_id, ClusterId(2));
    }

    #[test]
    fn too_few_distinct_scores_falls_back_to_thresholds() {
        let c = classifier().classify(&scores_snapshot(&[50.0, 50.0, 50.0, 20.0, 20.0]));
        assert_eq!(c.method, ClassificationMethod::Threshold);
        assert_eq!(c.level_counts(), [2, 3, 0]);
    }

    #[test]
    fn separated_groups_map_to_levels() {
        let scores = [5.0, 92.0, 45.0, 6.0, 50.0, 95.0, 7.0, 55.0, 90.0];
        let c = classifier().classify(&scores_snapshot(&scores));

        assert_eq!(c.method, ClassificationMethod::KMeans);
        assert_eq!(c.level_counts(), [3, 3, 3]);
        for s in &c.segments {
            let expected = match s.segment.congestion_score {
                x if x < 10.0 => CongestionLevel::Low,
                x if x < 60.0 => CongestionLevel::Medium,
                _ => CongestionLevel::High,
            };
            assert_eq!(s.classified_level, expected, "{}", s.segment.congestion_score);
            assert_eq!(s.method, ClassificationMethod::KMeans);
        }
        assert!((c.centers[0] - 6.0).abs() < 1e-9);
        assert!((c.centers[1] - 50.0).abs() < 1e-9);
        assert!((c.centers[2] - 92.333_333_333).abs() < 1e-6);
    }

    #[test]
    fn kmeans_labels_are_monotone_in_score() {
        for seed in 0..10 {
            let c = classifier().classify(&builtin_snapshot(seed));
            if c.method != ClassificationMethod::KMeans {
                continue;
            }
            for a in &c.segments {
                for b in &c.segments {
                    if a.segment.congestion_score < b.segment.congestion_score {
                        assert!(a.cluster_id <= b.cluster_id);
                    }
                }
            }
            assert!(c.centers.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let snap = builtin_snapshot(9);
        assert_eq!(classifier().classify(&snap), classifier().classify(&snap));
    }

    #[test]
    fn single_cluster_is_the_mean() {
        let params = ClusteringParams { n_clusters: 1, ..ClusteringParams::default() };
        let fit = kmeans_1d(&[1.0, 2.0, 6.0], &params, &mut SimRng::new(0));
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert!((fit.centers[0] - 3.0).abs() < 1e-12);
        assert!((fit.inertia - 14.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_params_rejected() {
        let params = ClusteringParams { n_clusters: 0, ..ClusteringParams::default() };
        assert!(CongestionClassifier::new(params, CongestionThresholds::default()).is_err());
        let params = ClusteringParams { n_clusters: 300, ..ClusteringParams::default() };
        assert!(CongestionClassifier::new(params, CongestionThresholds::default()).is_err());
    }

    #[test]
    fn many_clusters_keep_distinct_ids() {
        let scores: Vec<f64> = (0..300).map(|i| i as f64 / 3.0).collect();
        let params = ClusteringParams { n_clusters: 255, n_init: 1, ..ClusteringParams::default() };
        let c = CongestionClassifier::new(params, CongestionThresholds::default())
            .unwrap()
            .classify(&scores_snapshot(&scores));

        assert_eq!(c.method, ClassificationMethod::KMeans);
        assert!(c.segments.iter().all(|s| s.cluster_id != ClusterId::INVALID));
        // The top score sits in the highest-ranked cluster, not a wrapped one.
        let top = c.segments.last().unwrap();
        assert_eq!(top.cluster_id, ClusterId(254));
        assert_eq!(top.classified_level, CongestionLevel::High);
    }
}

// ── Anomaly detector ──────────────────────────────────────────────────────────

#[cfg(test)]
mod anomaly {
    use ct_core::AnomalyParams;
    use ct_sim::{RoadType, Snapshot};

    use crate::anomaly::{average_path_length, percentile};
    use crate::{AnomalyDetector, Severity};

    use super::helpers::{RUSH, builtin_snapshot, segment};

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(AnomalyParams::default()).unwrap()
    }

    #[test]
    fn tiny_samples_have_no_anomalies() {
        let report = detector().detect(&Snapshot::empty(RUSH));
        assert!(report.anomalies.is_empty());
        assert_eq!(report.threshold, None);

        let one = Snapshot::new(RUSH, vec![segment(0, RoadType::Local, 500, 100.0)]);
        assert!(detector().detect(&one).anomalies.is_empty());
    }

    #[test]
    fn never_exceeds_contamination_cap() {
        let d = detector();
        for seed in 0..30 {
            let snap = builtin_snapshot(seed);
            let report = d.detect(&snap);
            assert!(report.anomalies.len() <= d.max_flagged(snap.len()));
            assert!(report.anomalies.len() <= 2);
        }
    }

    #[test]
    fn obvious_outlier_is_flagged_first() {
        let mut segments: Vec<_> = (0..19)
            .map(|i| segment(i, RoadType::Collector, 10 + (i % 5) as u32, 10.0 + (i % 7) as f64))
            .collect();
        segments.push(segment(19, RoadType::Collector, 500, 100.0));
        let report = detector().detect(&Snapshot::new(RUSH, segments));

        assert!(!report.anomalies.is_empty());
        assert_eq!(report.anomalies[0].segment.road_id, "R019");
        assert!(report.anomalies[0].anomaly_score > report.threshold.unwrap());
        assert!(report.anomalies.windows(2).all(|w| w[0].anomaly_score >= w[1].anomaly_score));
    }

    #[test]
    fn detection_is_deterministic() {
        let snap = builtin_snapshot(4);
        assert_eq!(detector().detect(&snap), detector().detect(&snap));
    }

    #[test]
    fn scores_are_in_unit_interval() {
        let snap = builtin_snapshot(2);
        let report = detector().detect(&snap);
        for a in &report.anomalies {
            assert!(a.anomaly_score > 0.0 && a.anomaly_score <= 1.0);
        }
        assert_eq!(report.samples, 15);
    }

    #[test]
    fn cap_is_ceiling_of_fraction() {
        let d = detector();
        assert_eq!(d.max_flagged(0), 0);
        assert_eq!(d.max_flagged(1), 1);
        assert_eq!(d.max_flagged(10), 1);
        assert_eq!(d.max_flagged(15), 2);
        assert_eq!(d.max_flagged(30), 3);
    }

    #[test]
    fn contamination_validated() {
        assert!(AnomalyDetector::new(AnomalyParams { contamination: 0.0, ..AnomalyParams::default() }).is_err());
        assert!(AnomalyDetector::new(AnomalyParams { contamination: 0.7, ..AnomalyParams::default() }).is_err());
    }

    #[test]
    fn severity_bands() {
        assert_eq!(Severity::from_excess(0.01), Severity::Low);
        assert_eq!(Severity::from_excess(0.05), Severity::Medium);
        assert_eq!(Severity::from_excess(0.25), Severity::High);
    }

    #[test]
    fn percentile_interpolates() {
        let v = [5.0, 1.0, 3.0, 2.0, 4.0];
        assert_eq!(percentile(&v, 0.5), 3.0);
        assert!((percentile(&v, 0.9) - 4.6).abs() < 1e-12);
        assert_eq!(percentile(&v, 1.0), 5.0);
    }

    #[test]
    fn path_length_normaliser() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stats {
    use std::sync::Arc;

    use ct_core::{ClusteringParams, CongestionThresholds};
    use ct_sim::{RoadType, Snapshot};

    use crate::{CongestionClassifier, compute_stats};

    use super::helpers::{RUSH, segment};

    fn snapshot(ts: i64) -> Snapshot {
        Snapshot::new(ts, vec![
            segment(0, RoadType::Arterial, 100, 50.0),
            segment(1, RoadType::Arterial, 40, 20.0),
            segment(2, RoadType::Local, 45, 90.0),
        ])
    }

    #[test]
    fn current_and_per_type() {
        let snap = snapshot(RUSH);
        let classes = CongestionClassifier::new(ClusteringParams::default(), CongestionThresholds::default())
            .unwrap()
            .classify(&snap);
        let stats = compute_stats(&snap, &[], &classes, 1);

        assert_eq!(stats.current.total_vehicles, 185);
        assert_eq!(stats.current.total_roads, 3);
        assert!((stats.current.average_congestion - 53.33).abs() < 1e-9);
        assert_eq!(stats.anomaly_count, 1);

        // No collectors in the snapshot.
        assert_eq!(stats.road_type_stats.len(), 2);
        assert_eq!(stats.road_type_stats[0].road_type, RoadType::Arterial);
        assert_eq!(stats.road_type_stats[0].count, 2);
        assert_eq!(stats.road_type_stats[0].total_vehicles, 140);
        assert!((stats.road_type_stats[0].average_congestion - 35.0).abs() < 1e-9);

        let d = &stats.congestion_distribution;
        assert_eq!(d.low + d.medium + d.high, 3);
    }

    #[test]
    fn trend_keeps_last_ten_oldest_first() {
        let history: Vec<Arc<Snapshot>> = (0..12).map(|i| Arc::new(snapshot(RUSH + i * 5))).collect();
        let snap = history[11].as_ref().clone();
        let classes = CongestionClassifier::new(ClusteringParams::default(), CongestionThresholds::default())
            .unwrap()
            .classify(&snap);
        let stats = compute_stats(&snap, &history, &classes, 0);

        assert_eq!(stats.historical_trend.len(), 10);
        assert_eq!(stats.historical_trend[0].timestamp, RUSH + 10);
        assert_eq!(stats.historical_trend[9].timestamp, RUSH + 55);
    }
}
