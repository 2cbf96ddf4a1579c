use super::csv_format::{CsvFormat, parse_csv};
use crate::domain::dataset::Dataset;
use crate::domain::errors::DatasetError;
use crate::domain::ports::DatasetSource;
use crate::domain::schema::ColumnSchema;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// CSV dataset read from the local filesystem
pub struct CsvFileSource {
    path: PathBuf,
    format: CsvFormat,
    schema: ColumnSchema,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>, format: CsvFormat, schema: ColumnSchema) -> Self {
        Self {
            path: path.into(),
            format,
            schema,
        }
    }
}

#[async_trait]
impl DatasetSource for CsvFileSource {
    async fn load(&self) -> Result<Dataset, DatasetError> {
        info!(path = %self.path.display(), "Reading dataset from file");
        let bytes = tokio::fs::read(&self.path).await?;
        let dataset = parse_csv(bytes.as_slice(), &self.format, &self.schema)?;
        info!(
            rows = dataset.row_count(),
            columns = dataset.columns().len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
