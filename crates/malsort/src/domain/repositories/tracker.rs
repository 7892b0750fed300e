use async_trait::async_trait;
use malsort_tracker::{HistoryRecord, Session, Token};
use thiserror::Error;

use crate::domain::entities::{
    catalog::CatalogEntry,
    reorder::{ListStatusUpdate, UpdateOutcome},
};

#[derive(Debug, Error)]
pub enum TrackerRepositoryError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("tracker returned error: {0}")]
    Tracker(malsort_tracker::Error),
    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<malsort_tracker::Error> for TrackerRepositoryError {
    fn from(e: malsort_tracker::Error) -> Self {
        match e {
            malsort_tracker::Error::Unauthorized => Self::Unauthorized,
            e => Self::Tracker(e),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    /// Link to the following page, absent on the last one.
    pub next: Option<String>,
}

#[async_trait]
pub trait TrackerRepository: Send + Sync {
    fn get_authorize_url(&self) -> Result<Session, TrackerRepositoryError>;

    async fn exchange_code(
        &self,
        code: String,
        pkce_code_verifier: String,
    ) -> Result<Token, TrackerRepositoryError>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, TrackerRepositoryError>;

    async fn fetch_total_count(&self, token: &Token) -> Result<i64, TrackerRepositoryError>;

    async fn fetch_catalog_page(
        &self,
        token: &Token,
        next: Option<&str>,
    ) -> Result<CatalogPage, TrackerRepositoryError>;

    async fn fetch_update_history(
        &self,
        token: &Token,
        anime_id: i64,
    ) -> Result<HistoryRecord, TrackerRepositoryError>;

    async fn update_list_status(
        &self,
        token: &Token,
        anime_id: i64,
        update: &ListStatusUpdate,
    ) -> Result<UpdateOutcome, TrackerRepositoryError>;
}
