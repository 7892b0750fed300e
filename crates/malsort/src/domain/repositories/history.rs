use async_trait::async_trait;
use malsort_tracker::HistoryRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryRepositoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid history record: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Write-once store of scraped episode histories, one record per anime id.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn contains(&self, anime_id: i64) -> Result<bool, HistoryRepositoryError>;

    async fn save(&self, record: &HistoryRecord) -> Result<(), HistoryRepositoryError>;

    async fn load_all(&self) -> Result<Vec<HistoryRecord>, HistoryRepositoryError>;
}
