use crate::domain::dataset::Dataset;
use crate::domain::errors::DatasetError;
use async_trait::async_trait;

/// Where the monitored dataset comes from; loaded once at startup
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load(&self) -> Result<Dataset, DatasetError>;

    /// Human-readable location for logs
    fn location(&self) -> String;
}
