use async_trait::async_trait;
use malsort_tracker::Token;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenRepositoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid token file: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn load(&self) -> Result<Option<Token>, TokenRepositoryError>;

    async fn save(&self, token: &Token) -> Result<(), TokenRepositoryError>;
}
