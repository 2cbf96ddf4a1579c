//! Dataset configuration parsing from environment variables.
//!
//! This module decides where the dataset comes from, how its CSV is laid out
//! and which column schema types it.

use super::{Lookup, parse_or};
use crate::domain::ports::DatasetSource;
use crate::domain::schema::ColumnSchema;
use crate::infrastructure::dataset::{
    ADULT_COLUMNS, ADULT_DATA_URL, CsvFileSource, CsvFormat, HttpCsvSource,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Where the dataset is read from
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetLocation {
    Path(PathBuf),
    Url(String),
}

/// Dataset environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEnvConfig {
    pub location: DatasetLocation,
    pub has_header: bool,
    /// Column names for headerless files; Adult order when unset
    pub columns: Option<Vec<String>>,
    pub schema_path: Option<PathBuf>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DatasetEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let location = match lookup("DATASET_PATH") {
            Some(path) => DatasetLocation::Path(PathBuf::from(path)),
            None => DatasetLocation::Url(
                lookup("DATASET_URL").unwrap_or_else(|| ADULT_DATA_URL.to_string()),
            ),
        };

        let default_header = matches!(location, DatasetLocation::Path(_));
        let has_header = parse_or(lookup, "DATASET_HAS_HEADER", default_header)?;

        Ok(Self {
            location,
            has_header,
            columns: lookup("DATASET_COLUMNS").map(|raw| split_list(&raw)),
            schema_path: lookup("SCHEMA_PATH").map(PathBuf::from),
        })
    }

    pub fn csv_format(&self) -> CsvFormat {
        match (&self.columns, self.has_header) {
            (Some(columns), has_headers) => CsvFormat {
                has_headers,
                column_names: Some(columns.clone()),
            },
            (None, true) => CsvFormat::with_headers(),
            (None, false) => CsvFormat {
                has_headers: false,
                column_names: Some(ADULT_COLUMNS.iter().map(|s| s.to_string()).collect()),
            },
        }
    }

    /// Column schema from `SCHEMA_PATH`, or the Adult schema
    pub fn schema(&self) -> Result<ColumnSchema> {
        match &self.schema_path {
            Some(path) => ColumnSchema::load(path)
                .with_context(|| format!("Failed to load schema from {}", path.display())),
            None => Ok(ColumnSchema::adult()),
        }
    }

    pub fn source(&self, schema: ColumnSchema) -> Box<dyn DatasetSource> {
        match &self.location {
            DatasetLocation::Path(path) => {
                Box::new(CsvFileSource::new(path.clone(), self.csv_format(), schema))
            }
            DatasetLocation::Url(url) => {
                Box::new(HttpCsvSource::new(url.clone(), self.csv_format(), schema))
            }
        }
    }
}
