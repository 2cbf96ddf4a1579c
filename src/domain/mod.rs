// Tabular data and column typing
pub mod dataset;
pub mod schema;

// Reference/production slicing
pub mod partition;

// Drift statistics and reports
pub mod drift;
pub mod report;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
