use std::path::{Path, PathBuf};

use async_trait::async_trait;
use malsort_tracker::HistoryRecord;

use crate::{
    domain::repositories::history::{HistoryRepository, HistoryRepositoryError},
    infrastructure::utils::to_json_pretty,
};

/// Stores each record as `<cache_path>/<anime_id>.json`.
#[derive(Debug, Clone)]
pub struct HistoryRepositoryImpl {
    path: PathBuf,
}

impl HistoryRepositoryImpl {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn record_path(&self, anime_id: i64) -> PathBuf {
        self.path.join(format!("{anime_id}.json"))
    }
}

#[async_trait]
impl HistoryRepository for HistoryRepositoryImpl {
    async fn contains(&self, anime_id: i64) -> Result<bool, HistoryRepositoryError> {
        Ok(tokio::fs::try_exists(self.record_path(anime_id)).await?)
    }

    async fn save(&self, record: &HistoryRecord) -> Result<(), HistoryRepositoryError> {
        tokio::fs::create_dir_all(&self.path).await?;

        let path = self.record_path(record.anime_id);
        tokio::fs::write(&path, to_json_pretty(record)?).await?;
        debug!("saved to {}", path.display());

        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<HistoryRecord>, HistoryRepositoryError> {
        let mut read_dir = match tokio::fs::read_dir(&self.path).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut records = vec![];
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let data = tokio::fs::read(&path).await?;
            let record: HistoryRecord = serde_json::from_slice(&data).inspect_err(|e| {
                error!("cannot read {}: {e}", path.display());
            })?;
            records.push(record);
        }
        records.sort_by_key(|record| record.anime_id);

        Ok(records)
    }
}
