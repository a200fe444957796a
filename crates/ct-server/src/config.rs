//! Command-line and environment configuration.
//!
//! Every flag can also be set through the environment variable named in its
//! `env` attribute; an explicit flag wins over the environment.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ct_core::{
    AnomalyParams, ClusteringParams, CongestionThresholds, CtError, CtResult, GeoPoint, RoutingParams,
    SimulationParams,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "ct-server", version, about = "City traffic twin HTTP API")]
pub struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Enables `POST /reset`.
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Path prefix for every route, e.g. `/api`.
    #[arg(long, env = "API_PREFIX", default_value = "")]
    pub api_prefix: String,

    /// Seconds between snapshot refreshes; 0 disables refreshing.
    #[arg(long = "refresh-interval", env = "AUTO_REFRESH_INTERVAL", default_value_t = 5)]
    pub refresh_interval_secs: u64,

    #[arg(long, env = "SIMULATION_SPEED", default_value_t = 1.0)]
    pub simulation_speed: f64,

    #[arg(long = "max-history", env = "MAX_HISTORY_RECORDS", default_value_t = 200)]
    pub max_history: usize,

    #[arg(long = "clusters", env = "CLUSTERING_N_CLUSTERS", default_value_t = 3)]
    pub n_clusters: usize,

    #[arg(long = "clustering-seed", env = "CLUSTERING_RANDOM_STATE", default_value_t = 42)]
    pub clustering_seed: u64,

    #[arg(long, env = "ANOMALY_CONTAMINATION", default_value_t = 0.1)]
    pub contamination: f64,

    #[arg(long = "anomaly-seed", env = "ANOMALY_RANDOM_STATE", default_value_t = 42)]
    pub anomaly_seed: u64,

    #[arg(long = "route-weight-factor", env = "ROUTE_WEIGHT_FACTOR", default_value_t = 2.0)]
    pub route_weight_factor: f64,

    #[arg(long, env = "MAP_CENTER_LAT", default_value_t = 40.7128, allow_negative_numbers = true)]
    pub map_center_lat: f64,

    #[arg(long = "map-center-lng", env = "MAP_CENTER_LNG", default_value_t = -74.0060, allow_negative_numbers = true)]
    pub map_center_lon: f64,

    /// CSV road catalog; the built-in 15-road grid is used when absent.
    #[arg(long, env = "ROAD_CATALOG")]
    pub road_catalog: Option<PathBuf>,

    /// Fixed simulator seed; OS entropy when absent.
    #[arg(long, env = "SIM_SEED")]
    pub sim_seed: Option<u64>,

    /// Default `tracing` filter; `RUST_LOG` overrides it.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn map_center(&self) -> GeoPoint {
        GeoPoint::new(self.map_center_lat, self.map_center_lon)
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            simulation_speed: self.simulation_speed,
            map_center: self.map_center(),
            ..SimulationParams::default()
        }
    }

    pub fn thresholds(&self) -> CongestionThresholds {
        self.simulation_params().thresholds
    }

    pub fn clustering_params(&self) -> ClusteringParams {
        ClusteringParams {
            n_clusters: self.n_clusters,
            seed: self.clustering_seed,
            ..ClusteringParams::default()
        }
    }

    pub fn anomaly_params(&self) -> AnomalyParams {
        AnomalyParams {
            contamination: self.contamination,
            seed: self.anomaly_seed,
            ..AnomalyParams::default()
        }
    }

    pub fn routing_params(&self) -> RoutingParams {
        RoutingParams {
            congestion_penalty_factor: self.route_weight_factor,
            ..RoutingParams::default()
        }
    }

    /// `api_prefix` with exactly one leading slash and no trailing slash;
    /// empty when routes are served at the root.
    pub fn api_prefix(&self) -> String {
        normalize_prefix(&self.api_prefix)
    }

    /// Reject configurations the models or the simulator cannot run with.
    pub fn validate(&self) -> CtResult<()> {
        if !self.map_center().is_valid() {
            return Err(CtError::Config(format!("map centre {} is out of range", self.map_center())));
        }
        if self.max_history == 0 {
            return Err(CtError::Config("MAX_HISTORY_RECORDS must be >= 1".into()));
        }
        self.simulation_params().validate()?;
        self.clustering_params().validate()?;
        self.anomaly_params().validate()?;
        self.routing_params().validate()?;
        Ok(())
    }
}

pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, LogFormat, normalize_prefix};

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ct-server",
            "--port", "8080",
            "--contamination", "0.2",
            "--map-center-lng", "-73.5",
            "--log-format", "json",
        ])
        .unwrap();
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.anomaly_params().contamination, 0.2);
        assert_eq!(cli.map_center().lon, -73.5);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_contamination_fails_validation() {
        let cli = Cli::try_parse_from(["ct-server", "--contamination", "0.9"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn zero_history_fails_validation() {
        let cli = Cli::try_parse_from(["ct-server", "--max-history", "0"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn prefix_normalisation() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api/v1/"), "/api/v1");
    }
}
