use malsort_tracker::Token;
use thiserror::Error;

use crate::domain::{
    entities::{
        catalog::Catalog,
        history::{DateError, WatchPeriod},
        reorder::{ReorderRow, UpdateErrorPolicy},
    },
    repositories::{
        history::{HistoryRepository, HistoryRepositoryError},
        tracker::{TrackerRepository, TrackerRepositoryError},
    },
};

#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("tracker error: {0}")]
    TrackerError(#[from] TrackerRepositoryError),
    #[error("cache error: {0}")]
    CacheError(#[from] HistoryRepositoryError),
    #[error("invalid history: {0}")]
    DateError(#[from] DateError),
    #[error("update of {id} rejected with status {status}: {body}")]
    Rejected { id: i64, status: u16, body: String },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplySummary {
    pub updated: usize,
    pub rejected: usize,
}

pub struct ReorderService<R, H>
where
    R: TrackerRepository,
    H: HistoryRepository,
{
    tracker: R,
    cache: H,
    policy: UpdateErrorPolicy,
}

impl<R, H> ReorderService<R, H>
where
    R: TrackerRepository,
    H: HistoryRepository,
{
    pub fn new(tracker: R, cache: H, policy: UpdateErrorPolicy) -> Self {
        Self {
            tracker,
            cache,
            policy,
        }
    }

    /// Derives start and finish dates from every cached history, joins them
    /// with `catalog` on id and sorts by finish date.
    ///
    /// Histories without updates and ids missing from the catalog are skipped.
    /// A malformed date aborts the whole build.
    pub async fn build_table(&self, catalog: &Catalog) -> Result<Vec<ReorderRow>, ReorderError> {
        let records = self.cache.load_all().await?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let Some(period) = WatchPeriod::from_record(&record)? else {
                warn!(
                    "no updates recorded for {} ({}), skipping",
                    record.anime_title, record.anime_id
                );
                continue;
            };
            let Some(entry) = catalog.get(record.anime_id) else {
                debug!("{} is not in the catalog, skipping", record.anime_id);
                continue;
            };

            rows.push(ReorderRow {
                id: entry.id,
                start_date: period.start,
                finish_date: period.finish,
                score: entry.score,
                title: entry.title.clone(),
            });
        }

        rows.sort_by(|a, b| {
            a.finish_date
                .cmp(&b.finish_date)
                .then(a.start_date.cmp(&b.start_date))
                .then(a.id.cmp(&b.id))
        });

        Ok(rows)
    }

    /// Writes score and dates of every row, in order.
    pub async fn apply(
        &self,
        token: &Token,
        rows: &[ReorderRow],
    ) -> Result<ApplySummary, ReorderError> {
        let mut summary = ApplySummary::default();
        for row in rows {
            let outcome = self
                .tracker
                .update_list_status(token, row.id, &row.update())
                .await?;

            if outcome.is_success() {
                info!(
                    "updated {} ({}): {} -> {}",
                    row.title, row.id, row.start_date, row.finish_date
                );
                summary.updated += 1;
                continue;
            }

            match self.policy {
                UpdateErrorPolicy::Ignore => {
                    warn!(
                        "update of {} ({}) rejected with status {}: {}",
                        row.title, row.id, outcome.status, outcome.body
                    );
                    summary.rejected += 1;
                }
                UpdateErrorPolicy::Abort => {
                    return Err(ReorderError::Rejected {
                        id: row.id,
                        status: outcome.status,
                        body: outcome.body,
                    });
                }
            }
        }

        Ok(summary)
    }
}
