//! Drift monitor loop.
//!
//! Each cycle partitions the dataset, compares the two slices and publishes
//! the indicators to the metrics registry. Cycles run one after another with a
//! fixed sleep in between; a failed cycle is logged, flagged as unhealthy and
//! skipped.

use crate::domain::dataset::Dataset;
use crate::domain::drift::{self, DriftOptions};
use crate::domain::errors::{DriftError, MonitorError};
use crate::domain::partition::PartitionStrategy;
use crate::domain::report::DriftReport;
use crate::domain::schema::ColumnSchema;
use crate::infrastructure::observability::DriftMetrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Run one comparison synchronously: partition, build views, compare
pub fn evaluate(
    dataset: &Dataset,
    schema: &ColumnSchema,
    strategy: &dyn PartitionStrategy,
    options: &DriftOptions,
    cycle: u64,
) -> Result<DriftReport, DriftError> {
    let partition = strategy.split(dataset, cycle)?;
    if partition.total() != dataset.row_count() {
        return Err(DriftError::InvalidPartition {
            reason: format!(
                "slices hold {} rows, dataset has {}",
                partition.total(),
                dataset.row_count()
            ),
        });
    }

    let reference = dataset.view(&partition.reference, schema);
    let production = dataset.view(&partition.production, schema);
    drift::compare(&reference, &production, options)
}

pub struct DriftMonitor {
    dataset: Arc<Dataset>,
    schema: Arc<ColumnSchema>,
    strategy: Arc<dyn PartitionStrategy>,
    options: DriftOptions,
    metrics: DriftMetrics,
    interval: Duration,
}

impl DriftMonitor {
    pub fn new(
        dataset: Arc<Dataset>,
        schema: ColumnSchema,
        strategy: Arc<dyn PartitionStrategy>,
        options: DriftOptions,
        metrics: DriftMetrics,
        interval: Duration,
    ) -> Self {
        Self {
            dataset,
            schema: Arc::new(schema),
            strategy,
            options,
            metrics,
            interval,
        }
    }

    pub fn metrics(&self) -> &DriftMetrics {
        &self.metrics
    }

    /// Compute the report for `cycle` on a blocking worker.
    ///
    /// A panic inside the computation surfaces as [`MonitorError::Aborted`].
    pub async fn run_cycle(&self, cycle: u64) -> Result<DriftReport, MonitorError> {
        let dataset = self.dataset.clone();
        let schema = self.schema.clone();
        let strategy = self.strategy.clone();
        let options = self.options.clone();

        let report = tokio::task::spawn_blocking(move || {
            evaluate(&dataset, &schema, strategy.as_ref(), &options, cycle)
        })
        .await
        .map_err(|e| MonitorError::Aborted {
            reason: e.to_string(),
        })??;

        Ok(report)
    }

    /// Run one cycle inside the error boundary and publish its outcome
    pub async fn tick(&self, cycle: u64) -> Option<DriftReport> {
        let start = Instant::now();

        match self.run_cycle(cycle).await {
            Ok(report) => {
                let elapsed = start.elapsed();
                self.metrics.publish(&report.gauge_values());
                self.metrics.record_success(elapsed);

                info!(
                    cycle,
                    drifted_columns = ?report.drifted_count,
                    share_drifted = format!("{:.2}", report.share_drifted.unwrap_or(0.0)),
                    dataset_drift = ?report.dataset_drift,
                    example_column = report.drifted_column_example.as_deref().unwrap_or("-"),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Drift cycle complete"
                );
                if let Ok(json) = serde_json::to_string(&report) {
                    debug!(cycle, report = %json, "Drift report");
                }
                Some(report)
            }
            Err(e) => {
                self.metrics.record_failure(start.elapsed());
                error!(cycle, error = %e, "Drift cycle failed, continuing with next cycle");
                None
            }
        }
    }

    /// Run the loop until `stop` resolves; its result becomes the outcome
    pub async fn run_until<F>(self, stop: F) -> anyhow::Result<()>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        tokio::select! {
            _ = self.run() => Ok(()),
            result = stop => result,
        }
    }

    /// Loop forever: run a cycle, then sleep the fixed interval
    pub async fn run(self) {
        info!(
            "DriftMonitor: starting ({} rows, {} columns, interval {:?}, {})",
            self.dataset.row_count(),
            self.schema.len(),
            self.interval,
            self.strategy.describe()
        );

        let mut cycle: u64 = 0;
        loop {
            self.tick(cycle).await;
            cycle = cycle.wrapping_add(1);
            tokio::time::sleep(self.interval).await;
        }
    }
}
