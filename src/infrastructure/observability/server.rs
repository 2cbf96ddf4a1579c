//! Pull-based metrics endpoint.
//!
//! Serves `/metrics` in Prometheus text format and a `/health` liveness check.
//! Handlers only read the registry; they never block the monitor loop.

use crate::infrastructure::observability::metrics::DriftMetrics;
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

async fn metrics_handler(State(metrics): State<DriftMetrics>) -> impl IntoResponse {
    let content_type = TextEncoder::new().format_type().to_string();
    ([(header::CONTENT_TYPE, content_type)], metrics.render())
}

async fn health_handler(State(metrics): State<DriftMetrics>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
        "monitor_healthy": metrics.is_healthy(),
    }))
}

pub fn router(metrics: DriftMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

/// Metrics HTTP server bound to its listening socket
pub struct MetricsServer {
    listener: TcpListener,
    metrics: DriftMetrics,
}

impl MetricsServer {
    /// Bind the listening socket; failure here is fatal at startup
    pub async fn bind(addr: SocketAddr, metrics: DriftMetrics) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind metrics endpoint on {}", addr))?;
        Ok(Self { listener, metrics })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until the task is dropped
    pub async fn serve(self) -> Result<()> {
        let addr = self.local_addr()?;
        info!("Prometheus metrics available at http://{}/metrics", addr);
        axum::serve(self.listener, router(self.metrics))
            .await
            .context("Metrics server stopped")
    }
}

/// Wait on a spawned [`MetricsServer::serve`] task; any exit is an error
pub async fn endpoint_stopped(task: JoinHandle<Result<()>>) -> anyhow::Error {
    match task.await {
        Ok(Ok(())) => anyhow::anyhow!("Metrics endpoint stopped serving"),
        Ok(Err(e)) => e.context("Metrics endpoint failed"),
        Err(e) => anyhow::Error::new(e).context("Metrics endpoint task panicked"),
    }
}
