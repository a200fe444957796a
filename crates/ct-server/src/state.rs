//! Shared handler state.

use std::sync::Arc;

use ct_analysis::{AnomalyDetector, CongestionClassifier};
use ct_sim::{LiveSnapshots, SnapshotProvider};
use ct_spatial::{LocationRegistry, RoutePlanner};

use crate::config::Cli;

/// Everything a request handler needs.  Cloned behind an `Arc`; all models
/// are stateless and refit per request against the provider's snapshot.
pub struct AppState {
    pub provider:   Arc<dyn SnapshotProvider>,
    /// Present when the provider is a live simulator; needed by `/reset`.
    pub live:       Option<Arc<LiveSnapshots>>,
    pub classifier: CongestionClassifier,
    pub detector:   AnomalyDetector,
    pub planner:    RoutePlanner,
    pub debug:      bool,
    pub refresh_interval_secs: u64,
}

impl AppState {
    pub fn new(
        provider:   Arc<dyn SnapshotProvider>,
        classifier: CongestionClassifier,
        detector:   AnomalyDetector,
        planner:    RoutePlanner,
    ) -> Self {
        Self { provider, live: None, classifier, detector, planner, debug: false, refresh_interval_secs: 0 }
    }

    /// State backed by a live provider, with models configured from `cli`.
    pub fn from_cli(cli: &Cli, live: Arc<LiveSnapshots>) -> anyhow::Result<Self> {
        let classifier = CongestionClassifier::new(cli.clustering_params(), cli.thresholds())?;
        let detector = AnomalyDetector::new(cli.anomaly_params())?;
        let planner = RoutePlanner::new(LocationRegistry::standard(cli.map_center()), cli.routing_params());

        let provider: Arc<dyn SnapshotProvider> = live.clone();
        Ok(Self {
            live: Some(live),
            debug: cli.debug,
            refresh_interval_secs: cli.refresh_interval_secs,
            ..Self::new(provider, classifier, detector, planner)
        })
    }

    pub fn with_live(mut self, live: Arc<LiveSnapshots>) -> Self {
        self.provider = live.clone();
        self.live = Some(live);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
