// Periodic drift evaluation and publishing
pub mod monitor;

pub use monitor::DriftMonitor;
