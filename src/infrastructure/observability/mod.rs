//! Pull-based observability for the drift monitor
//!
//! The monitor writes gauges into an owned Prometheus registry
//! ([`DriftMetrics`]); a separate HTTP task exposes it for scraping.

pub mod metrics;
pub mod server;

pub use metrics::DriftMetrics;
pub use server::{MetricsServer, endpoint_stopped};
