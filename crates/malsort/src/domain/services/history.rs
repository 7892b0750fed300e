use malsort_tracker::Token;
use thiserror::Error;

use crate::domain::{
    entities::catalog::Catalog,
    repositories::{
        history::{HistoryRepository, HistoryRepositoryError},
        tracker::{TrackerRepository, TrackerRepositoryError},
    },
};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("tracker error: {0}")]
    TrackerError(#[from] TrackerRepositoryError),
    #[error("cache error: {0}")]
    CacheError(#[from] HistoryRepositoryError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheSummary {
    pub fetched: usize,
    pub skipped: usize,
}

pub struct HistoryService<R, H>
where
    R: TrackerRepository,
    H: HistoryRepository,
{
    tracker: R,
    cache: H,
}

impl<R, H> HistoryService<R, H>
where
    R: TrackerRepository,
    H: HistoryRepository,
{
    pub fn new(tracker: R, cache: H) -> Self {
        Self { tracker, cache }
    }

    /// Scrapes and stores the history of `anime_id` unless it is already
    /// cached. Returns whether a fetch happened.
    pub async fn cache_history(&self, token: &Token, anime_id: i64) -> Result<bool, HistoryError> {
        if self.cache.contains(anime_id).await? {
            debug!("history of {anime_id} already cached");
            return Ok(false);
        }

        let record = self.tracker.fetch_update_history(token, anime_id).await?;
        self.cache.save(&record).await?;
        info!("cached history of {} ({anime_id})", record.anime_title);

        Ok(true)
    }

    pub async fn cache_completed(
        &self,
        token: &Token,
        catalog: &Catalog,
    ) -> Result<CacheSummary, HistoryError> {
        let mut summary = CacheSummary::default();
        for entry in catalog.completed() {
            if self.cache_history(token, entry.id).await? {
                summary.fetched += 1;
            } else {
                summary.skipped += 1;
            }
        }

        info!(
            "cached watch histories: {} fetched, {} already cached",
            summary.fetched, summary.skipped
        );
        Ok(summary)
    }
}
