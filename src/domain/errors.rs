use thiserror::Error;

/// Errors raised while loading or validating the monitored dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to download dataset from {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Column '{column}' not found in dataset")]
    MissingColumn { column: String },

    #[error("Invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Dataset contains no rows")]
    Empty,

    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },
}

/// Errors raised while partitioning or comparing dataset slices
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("{slice} slice is empty ({total_rows} rows in dataset)")]
    EmptySlice {
        slice: &'static str,
        total_rows: usize,
    },

    #[error("Column '{column}' not found in dataset")]
    UnknownColumn { column: String },

    #[error("Method {method} cannot be applied to {kind} column '{column}'")]
    IncompatibleMethod {
        method: String,
        kind: String,
        column: String,
    },

    #[error("Statistical test {method} failed on column '{column}': {reason}")]
    Statistics {
        method: String,
        column: String,
        reason: String,
    },

    #[error("Invalid partition: {reason}")]
    InvalidPartition { reason: String },
}

/// Errors that abort a single monitoring cycle
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Drift computation failed: {0}")]
    Drift(#[from] DriftError),

    #[error("Cycle task aborted: {reason}")]
    Aborted { reason: String },
}
