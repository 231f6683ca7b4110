//! REST API handlers for metrics reports and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use pacing_core::types::MetricsSnapshot;
use pacing_reporting::{validate_snapshot, MetricsReport, ReportBuilder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<ReportBuilder>,
    /// Snapshot loaded at startup, served by `GET /v1/metrics`.
    pub snapshot: Option<Arc<MetricsSnapshot>>,
    pub max_events: usize,
    pub node_id: String,
    pub start_time: Instant,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// POST /v1/metrics — build a report over the posted snapshot.
pub async fn post_metrics(
    State(state): State<AppState>,
    Json(snapshot): Json<MetricsSnapshot>,
) -> Result<Json<MetricsReport>, ApiError> {
    metrics::counter!("api.metrics_requests").increment(1);

    if let Err(e) = validate_snapshot(&snapshot, state.max_events) {
        warn!(error = %e, events = snapshot.events.len(), "Snapshot validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid_snapshot".to_string(),
                message: e.to_string(),
            }),
        ));
    }

    let report = state.builder.build(&snapshot, today());
    info!(
        node_id = %state.node_id,
        accounts = report.accounts.len(),
        campaigns = report.campaign_optimization.len(),
        "Served posted snapshot report"
    );
    Ok(Json(report))
}

/// GET /v1/metrics — report over the snapshot loaded at startup.
pub async fn get_metrics(State(state): State<AppState>) -> Result<Json<MetricsReport>, ApiError> {
    metrics::counter!("api.metrics_requests").increment(1);

    match &state.snapshot {
        Some(snapshot) => Ok(Json(state.builder.build(snapshot, today()))),
        None => {
            error!(node_id = %state.node_id, "No snapshot loaded");
            metrics::counter!("api.errors").increment(1);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "snapshot_unavailable".to_string(),
                    message: "No snapshot was loaded at startup".to_string(),
                }),
            ))
        }
    }
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        snapshot_loaded: state.snapshot.is_some(),
    })
}

/// GET /ready — Readiness probe.
/// Posted snapshots need no preload, so the service is ready once it is up.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub snapshot_loaded: bool,
}
