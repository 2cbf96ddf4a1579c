//! Driftwatch - data drift monitor
//!
//! Loads a tabular dataset once, then repeatedly compares a reference slice
//! against a production slice and exposes the drift indicators for Prometheus.
//!
//! # Usage
//! ```sh
//! DRIFT_INTERVAL_SECS=10 METRICS_PORT=9100 cargo run
//! ```
//!
//! # Environment Variables
//! - `DATASET_PATH` / `DATASET_URL` - Dataset location (default: UCI Adult download)
//! - `DRIFT_INTERVAL_SECS` - Seconds between cycles (default: 30)
//! - `METRICS_PORT` - Port for `/metrics` and `/health` (default: 8000)
//! - `RUST_LOG` - Log filter (default: info)

use anyhow::{Context, Result};
use driftwatch::application::DriftMonitor;
use driftwatch::config::Config;
use driftwatch::infrastructure::{DriftMetrics, MetricsServer, endpoint_stopped};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::prelude::*;

/// Resolve on Ctrl+C; fail if the metrics endpoint stops serving
async fn shutdown_signal(server_task: JoinHandle<Result<()>>) -> Result<()> {
    tokio::select! {
        e = endpoint_stopped(server_task) => Err(e),
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            info!("Shutdown signal received. Exiting...");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(config.observability.env_filter())
        .with(stdout_layer)
        .init();

    info!("Driftwatch {} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: Dataset={:?}, Interval={}s, Threshold={}, DriftShare={}",
        config.dataset.location,
        config.monitor.interval_secs,
        config.monitor.threshold,
        config.monitor.drift_share
    );

    // Endpoint comes up first so scrapes succeed before the first cycle
    let metrics = DriftMetrics::new()?;
    let server = MetricsServer::bind(config.observability.socket_addr()?, metrics.clone()).await?;
    let server_task = tokio::spawn(server.serve());

    let schema = config.dataset.schema()?;
    let source = config.dataset.source(schema.clone());
    info!("Loading dataset from {}", source.location());
    let dataset = source
        .load()
        .await
        .with_context(|| format!("Failed to load dataset from {}", source.location()))?;
    let strategy = config.monitor.partition.build();
    strategy
        .validate(&dataset)
        .context("Partition strategy cannot be applied to the dataset")?;

    let monitor = DriftMonitor::new(
        Arc::new(dataset),
        schema,
        strategy,
        config.monitor.drift_options(),
        metrics,
        config.monitor.interval(),
    );

    info!("Monitor running. Press Ctrl+C to shutdown.");
    monitor.run_until(shutdown_signal(server_task)).await
}
