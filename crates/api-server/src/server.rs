//! API server — HTTP routes plus the Prometheus exporter.

use crate::rest::{self, AppState};
use axum::routing::get;
use axum::Router;
use pacing_core::config::AppConfig;
use pacing_core::types::MetricsSnapshot;
use pacing_reporting::ReportBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    builder: Arc<ReportBuilder>,
    snapshot: Option<Arc<MetricsSnapshot>>,
}

impl ApiServer {
    pub fn new(
        config: AppConfig,
        builder: Arc<ReportBuilder>,
        snapshot: Option<Arc<MetricsSnapshot>>,
    ) -> Self {
        Self {
            config,
            builder,
            snapshot,
        }
    }

    fn state(&self) -> AppState {
        AppState {
            builder: self.builder.clone(),
            snapshot: self.snapshot.clone(),
            max_events: self.config.api.max_events,
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        }
    }

    /// Routes and middleware, without binding a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/v1/metrics", get(rest::get_metrics).post(rest::post_metrics))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state())
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(
            addr = %addr,
            snapshot_loaded = self.snapshot.is_some(),
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }

    /// Start the metrics exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
