//! HTTP API handlers.
//!
//! Every response body is JSON with a `status` field: `"success"` plus a
//! payload, or `"error"` plus a `message`.  `/route` puts its result under
//! `route`; the other endpoints use `data`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use ct_analysis::compute_stats;
use ct_core::time::now_unix_secs;
use ct_spatial::{RouteError, RouteErrorKind};

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Snapshots the stats trend is computed from.
const TREND_WINDOW: usize = ct_analysis::stats::TREND_WINDOW;

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the Axum router, serving every route under `prefix` (`""` for the
/// root, otherwise a normalised `/segment` path).
pub fn build_router(state: Arc<AppState>, prefix: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/traffic", get(traffic))
        .route("/anomalies", get(anomalies))
        .route("/route", get(route))
        .route("/stats", get(stats))
        .route("/locations", get(locations))
        .route("/ml-status", get(ml_status))
        .route("/reset", post(reset));

    let app = if prefix.is_empty() { api } else { Router::new().nest(prefix, api) };

    app.fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Unresolvable route endpoints are a client error, not a missing
            // resource.
            ApiError::InvalidRequest(_) | ApiError::NotFound(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(e: RouteError) -> Self {
        match e.kind() {
            RouteErrorKind::InvalidRequest => ApiError::InvalidRequest(e.to_string()),
            RouteErrorKind::NotFound => ApiError::NotFound(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "status": "error", "message": self.to_string() }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

// ── Info ──────────────────────────────────────────────────────────────────────

async fn index() -> Json<Value> {
    Json(json!({
        "status": "success",
        "name": "City Traffic Twin API",
        "version": VERSION,
        "endpoints": {
            "/traffic": "current traffic with classified congestion levels",
            "/anomalies": "segments flagged by the anomaly detector",
            "/route?start=&end=": "congestion-aware route between two locations",
            "/stats": "aggregate statistics and recent trend",
            "/locations": "labels accepted by /route",
            "/ml-status": "model parameters and data status",
            "/health": "liveness check",
        },
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.provider.current();
    Json(json!({
        "status": "success",
        "healthy": true,
        "version": VERSION,
        "timestamp": now_unix_secs(),
        "snapshot_timestamp": snapshot.timestamp,
        "roads": snapshot.len(),
    }))
}

async fn not_found() -> Response {
    let body = json!({ "status": "error", "message": "endpoint not found" });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

// ── Traffic ───────────────────────────────────────────────────────────────────

async fn traffic(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.provider.current();
    let classification = state.classifier.classify(&snapshot);

    Ok(Json(json!({
        "status": "success",
        "data": classification.segments,
        "metadata": {
            "total_roads": snapshot.len(),
            "timestamp": snapshot.timestamp,
            "method": classification.method.as_str(),
            "centers": classification.centers,
            "total_vehicles": snapshot.total_vehicles(),
        },
    })))
}

async fn anomalies(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.provider.current();
    let report = state.detector.detect(&snapshot);
    let total_anomalies = report.anomalies.len();

    Ok(Json(json!({
        "status": "success",
        "data": report.anomalies,
        "metadata": {
            "total_anomalies": total_anomalies,
            "total_roads": report.samples,
            "threshold": report.threshold,
            "contamination": report.contamination,
            "timestamp": snapshot.timestamp,
        },
    })))
}

// ── Route ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    start: Option<String>,
    end: Option<String>,
}

async fn route(State(state): State<Arc<AppState>>, Query(q): Query<RouteQuery>) -> ApiResult {
    let (Some(start), Some(end)) = (q.start, q.end) else {
        return Err(ApiError::InvalidRequest("both start and end parameters are required".into()));
    };

    let snapshot = state.provider.current();
    let result = state.planner.find_route(&start, &end, &snapshot).map_err(|e| {
        debug!(%start, %end, error = %e, "route query rejected");
        ApiError::from(e)
    })?;

    Ok(Json(json!({ "status": "success", "route": result })))
}

async fn locations(State(state): State<Arc<AppState>>) -> Json<Value> {
    let locations: Vec<_> = state.planner.locations().iter().collect();
    Json(json!({ "status": "success", "data": locations }))
}

// ── Stats & model status ──────────────────────────────────────────────────────

async fn stats(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.provider.current();
    let history = state.provider.recent(TREND_WINDOW);
    let classification = state.classifier.classify(&snapshot);
    let anomaly_count = state.detector.detect(&snapshot).anomalies.len();

    let stats = compute_stats(&snapshot, &history, &classification, anomaly_count);
    Ok(Json(json!({ "status": "success", "data": stats })))
}

async fn ml_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.provider.current();
    let clustering = state.classifier.params();
    let anomaly = state.detector.params();
    let routing = state.planner.params();
    let thresholds = state.classifier.thresholds();

    Json(json!({
        "status": "success",
        "data": {
            "classifier": {
                "algorithm": "kmeans",
                "n_clusters": clustering.n_clusters,
                "random_state": clustering.seed,
                "n_init": clustering.n_init,
                "fallback_thresholds": { "low": thresholds.low_max, "medium": thresholds.medium_max },
            },
            "anomaly_detector": {
                "algorithm": "isolation_forest",
                "contamination": anomaly.contamination,
                "random_state": anomaly.seed,
                "n_estimators": anomaly.n_trees,
                "max_samples": anomaly.max_samples,
            },
            "routing": {
                "algorithm": "dijkstra",
                "congestion_penalty_factor": routing.congestion_penalty_factor,
                "average_speed_kmh": routing.average_speed_kmh,
            },
            "data": {
                "current_roads": snapshot.len(),
                "snapshot_timestamp": snapshot.timestamp,
                "history_records": state.provider.history_len(),
                "refresh_interval_secs": state.refresh_interval_secs,
            },
        },
    }))
}

// ── Reset ─────────────────────────────────────────────────────────────────────

async fn reset(State(state): State<Arc<AppState>>) -> ApiResult {
    if !state.debug {
        return Err(ApiError::Forbidden("reset is only available in debug mode".into()));
    }
    let Some(live) = &state.live else {
        return Err(ApiError::Internal("no live simulator to reset".into()));
    };

    let snapshot = live.reset(now_unix_secs());
    info!(timestamp = snapshot.timestamp, "simulation reset via API");

    Ok(Json(json!({
        "status": "success",
        "message": "simulation reset",
        "timestamp": snapshot.timestamp,
    })))
}
