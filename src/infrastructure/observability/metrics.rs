//! Prometheus metrics definitions for the drift monitor
//!
//! Drift indicators use the `ml_` prefix expected by existing dashboards;
//! monitor health metrics use `ml_drift_`.

use crate::domain::report::GaugeValues;
use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;
use std::time::Duration;

/// Metrics registry owned by the monitor and read by the `/metrics` endpoint
#[derive(Clone)]
pub struct DriftMetrics {
    registry: Arc<Registry>,
    /// Number of drifted columns in the last successful cycle
    pub drifted_columns: GenericGauge<AtomicF64>,
    /// Share of drifted columns (0-1)
    pub share_drifted: GenericGauge<AtomicF64>,
    /// Dataset drift flag (0/1)
    pub dataset_drift: GenericGauge<AtomicF64>,
    /// Fingerprint of one drifted column (0 = none, 1-99 otherwise)
    pub drifted_column_example: GenericGauge<AtomicF64>,
    /// 1 after a successful cycle, 0 after a failed one or before the first cycle
    pub monitor_healthy: GenericGauge<AtomicF64>,
    /// Unix time of the last successful cycle
    pub last_success_timestamp_seconds: GenericGauge<AtomicF64>,
    /// Cycles by outcome
    pub cycles_total: CounterVec,
    /// Wall time of the drift computation
    pub cycle_duration_seconds: Histogram,
}

fn register_gauge(registry: &Registry, name: &str, help: &str) -> anyhow::Result<Gauge> {
    let gauge = Gauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

impl DriftMetrics {
    /// Create a new registry with every drift gauge registered at zero
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let drifted_columns =
            register_gauge(&registry, "ml_drifted_columns", "Number of drifted columns")?;
        let share_drifted =
            register_gauge(&registry, "ml_share_drifted", "Share of drifted columns")?;
        let dataset_drift = register_gauge(
            &registry,
            "ml_dataset_drift",
            "1 if dataset drift detected",
        )?;
        let drifted_column_example = register_gauge(
            &registry,
            "ml_drifted_column_example",
            "Example of one drifted column encoded as int",
        )?;
        let monitor_healthy = register_gauge(
            &registry,
            "ml_drift_monitor_healthy",
            "1 if the last drift cycle succeeded",
        )?;
        let last_success_timestamp_seconds = register_gauge(
            &registry,
            "ml_drift_last_success_timestamp_seconds",
            "Unix time of the last successful drift cycle",
        )?;

        let cycles_total = CounterVec::new(
            Opts::new("ml_drift_cycles_total", "Drift cycles by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(cycles_total.clone()))?;

        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "ml_drift_cycle_duration_seconds",
                "Drift computation time in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            drifted_columns,
            share_drifted,
            dataset_drift,
            drifted_column_example,
            monitor_healthy,
            last_success_timestamp_seconds,
            cycles_total,
            cycle_duration_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Overwrite the four drift gauges
    pub fn publish(&self, values: &GaugeValues) {
        self.drifted_columns.set(values.drifted_columns);
        self.share_drifted.set(values.share_drifted);
        self.dataset_drift.set(values.dataset_drift);
        self.drifted_column_example
            .set(values.drifted_column_example);
    }

    pub fn record_success(&self, elapsed: Duration) {
        self.monitor_healthy.set(1.0);
        self.last_success_timestamp_seconds
            .set(chrono::Utc::now().timestamp() as f64);
        self.cycles_total.with_label_values(&["success"]).inc();
        self.cycle_duration_seconds.observe(elapsed.as_secs_f64());
    }

    /// Mark the monitor unhealthy; drift gauges keep their last values
    pub fn record_failure(&self, elapsed: Duration) {
        self.monitor_healthy.set(0.0);
        self.cycles_total.with_label_values(&["failure"]).inc();
        self.cycle_duration_seconds.observe(elapsed.as_secs_f64());
    }

    pub fn is_healthy(&self) -> bool {
        self.monitor_healthy.get() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = DriftMetrics::new().expect("Failed to create metrics");
        let output = metrics.render();
        for name in [
            "ml_drifted_columns 0",
            "ml_share_drifted 0",
            "ml_dataset_drift 0",
            "ml_drifted_column_example 0",
        ] {
            assert!(output.contains(name), "missing {}", name);
        }
        assert!(!metrics.is_healthy());
    }

    #[test]
    fn test_publish_overwrites() {
        let metrics = DriftMetrics::new().expect("Failed to create metrics");
        metrics.publish(&GaugeValues {
            drifted_columns: 9.0,
            share_drifted: 0.6,
            dataset_drift: 1.0,
            drifted_column_example: 42.0,
        });
        metrics.publish(&GaugeValues {
            drifted_columns: 3.0,
            share_drifted: 0.2,
            dataset_drift: 0.0,
            drifted_column_example: 7.0,
        });

        let output = metrics.render();
        assert!(output.contains("ml_drifted_columns 3"));
        assert!(output.contains("ml_share_drifted 0.2"));
        assert!(output.contains("ml_dataset_drift 0"));
        assert!(output.contains("ml_drifted_column_example 7"));
    }

    #[test]
    fn test_health_transitions() {
        let metrics = DriftMetrics::new().expect("Failed to create metrics");
        metrics.record_success(Duration::from_millis(20));
        assert!(metrics.is_healthy());
        assert!(metrics.last_success_timestamp_seconds.get() > 0.0);

        metrics.record_failure(Duration::from_millis(5));
        assert!(!metrics.is_healthy());

        let output = metrics.render();
        assert!(output.contains("ml_drift_cycles_total{outcome=\"success\"} 1"));
        assert!(output.contains("ml_drift_cycles_total{outcome=\"failure\"} 1"));
    }
}
