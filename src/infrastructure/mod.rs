pub mod dataset;
pub mod observability;

pub use dataset::{CsvFileSource, HttpCsvSource};
pub use observability::{DriftMetrics, MetricsServer, endpoint_stopped};
