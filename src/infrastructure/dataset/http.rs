use super::csv_format::{CsvFormat, parse_csv};
use crate::domain::dataset::Dataset;
use crate::domain::errors::DatasetError;
use crate::domain::ports::DatasetSource;
use crate::domain::schema::ColumnSchema;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

/// Public UCI Adult census training split
pub const ADULT_DATA_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/adult/adult.data";

/// CSV dataset downloaded once over HTTP
pub struct HttpCsvSource {
    client: Client,
    url: String,
    format: CsvFormat,
    schema: ColumnSchema,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>, format: CsvFormat, schema: ColumnSchema) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            url: url.into(),
            format,
            schema,
        }
    }

    fn download_error(&self, reason: impl ToString) -> DatasetError {
        DatasetError::Download {
            url: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl DatasetSource for HttpCsvSource {
    async fn load(&self) -> Result<Dataset, DatasetError> {
        info!(url = %self.url, "Downloading dataset");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.download_error(e))?;

        if !response.status().is_success() {
            return Err(self.download_error(format!("status {}", response.status())));
        }

        let body = response.bytes().await.map_err(|e| self.download_error(e))?;
        let dataset = parse_csv(body.as_ref(), &self.format, &self.schema)?;
        info!(
            rows = dataset.row_count(),
            bytes = body.len(),
            "Dataset downloaded"
        );
        Ok(dataset)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}
