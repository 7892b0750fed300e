use std::path::{Path, PathBuf};

use async_trait::async_trait;
use malsort_tracker::Token;

use crate::{
    domain::repositories::token::{TokenRepository, TokenRepositoryError},
    infrastructure::utils::to_json_pretty,
};

/// JSON token file; its absence means the user has not authorized yet.
#[derive(Debug, Clone)]
pub struct TokenRepositoryImpl {
    path: PathBuf,
}

impl TokenRepositoryImpl {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl TokenRepository for TokenRepositoryImpl {
    async fn load(&self) -> Result<Option<Token>, TokenRepositoryError> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => {
                debug!("loaded token from {}", self.path.display());
                Ok(Some(serde_json::from_slice(&data)?))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &Token) -> Result<(), TokenRepositoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, to_json_pretty(token)?).await?;
        info!("token saved in {}", self.path.display());

        Ok(())
    }
}
