//! In-memory repositories for service tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use malsort_tracker::{CsrfToken, HistoryRecord, PkceCodeVerifier, Session, Token};

use crate::domain::{
    entities::{
        catalog::CatalogEntry,
        reorder::{ListStatusUpdate, UpdateOutcome},
    },
    repositories::{
        history::{HistoryRepository, HistoryRepositoryError},
        token::{TokenRepository, TokenRepositoryError},
        tracker::{CatalogPage, TrackerRepository, TrackerRepositoryError},
    },
};

pub const STATE: &str = "csrf-state";
pub const VERIFIER: &str = "pkce-verifier";

pub fn token(access_token: &str) -> Token {
    Token {
        token_type: "bearer".to_string(),
        expires_in: 2678400,
        access_token: access_token.to_string(),
        refresh_token: format!("{access_token}-refresh"),
    }
}

pub fn entry(id: i64, title: &str, status: &str, score: i64) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_string(),
        status: Some(status.to_string()),
        score,
        ..Default::default()
    }
}

pub fn record(anime_id: i64, title: &str, updates: &[&str]) -> HistoryRecord {
    HistoryRecord {
        anime_title: title.to_string(),
        anime_id,
        updates: updates.iter().map(|u| u.to_string()).collect(),
    }
}

#[derive(Debug, Default)]
pub struct TrackerState {
    pub pages: Vec<Vec<CatalogEntry>>,
    pub total: i64,
    pub histories: HashMap<i64, HistoryRecord>,
    pub rejected_ids: HashSet<i64>,
    pub expired_access_token: Option<String>,
    pub history_calls: Vec<i64>,
    pub page_calls: usize,
    pub updates: Vec<(i64, ListStatusUpdate)>,
    pub exchanged: Vec<(String, String)>,
    pub refreshed: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct FakeTracker {
    pub state: Arc<Mutex<TrackerState>>,
}

impl FakeTracker {
    pub fn with_pages(pages: Vec<Vec<CatalogEntry>>) -> Self {
        let total = pages.iter().map(|p| p.len() as i64).sum();
        let tracker = Self::default();
        {
            let mut state = tracker.state.lock().unwrap();
            state.pages = pages;
            state.total = total;
        }
        tracker
    }

    pub fn add_history(&self, record: HistoryRecord) {
        let mut state = self.state.lock().unwrap();
        state.histories.insert(record.anime_id, record);
    }

    fn check(&self, token: &Token) -> Result<(), TrackerRepositoryError> {
        let state = self.state.lock().unwrap();
        if state.expired_access_token.as_deref() == Some(token.access_token.as_str()) {
            return Err(TrackerRepositoryError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl TrackerRepository for FakeTracker {
    fn get_authorize_url(&self) -> Result<Session, TrackerRepositoryError> {
        Ok(Session {
            authorize_url: format!("https://example.test/authorize?state={STATE}"),
            csrf_state: CsrfToken::new(STATE.to_string()),
            pkce_code_verifier: Some(PkceCodeVerifier::new(VERIFIER.to_string())),
        })
    }

    async fn exchange_code(
        &self,
        code: String,
        pkce_code_verifier: String,
    ) -> Result<Token, TrackerRepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.exchanged.push((code.clone(), pkce_code_verifier));
        Ok(token(&format!("access-{code}")))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, TrackerRepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.refreshed.push(refresh_token.to_string());
        Ok(token("refreshed"))
    }

    async fn fetch_total_count(&self, token: &Token) -> Result<i64, TrackerRepositoryError> {
        self.check(token)?;
        Ok(self.state.lock().unwrap().total)
    }

    async fn fetch_catalog_page(
        &self,
        token: &Token,
        next: Option<&str>,
    ) -> Result<CatalogPage, TrackerRepositoryError> {
        self.check(token)?;
        let mut state = self.state.lock().unwrap();
        state.page_calls += 1;

        let index = match next {
            Some(next) => next
                .trim_start_matches("page-")
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("{e}"))?,
            None => 0,
        };
        let entries = state.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < state.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(CatalogPage { entries, next })
    }

    async fn fetch_update_history(
        &self,
        token: &Token,
        anime_id: i64,
    ) -> Result<HistoryRecord, TrackerRepositoryError> {
        self.check(token)?;
        let mut state = self.state.lock().unwrap();
        state.history_calls.push(anime_id);
        state
            .histories
            .get(&anime_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no history for {anime_id}").into())
    }

    async fn update_list_status(
        &self,
        token: &Token,
        anime_id: i64,
        update: &ListStatusUpdate,
    ) -> Result<UpdateOutcome, TrackerRepositoryError> {
        self.check(token)?;
        let mut state = self.state.lock().unwrap();
        state.updates.push((anime_id, update.clone()));
        if state.rejected_ids.contains(&anime_id) {
            Ok(UpdateOutcome {
                status: 400,
                body: r#"{"error":"invalid_content"}"#.to_string(),
            })
        } else {
            Ok(UpdateOutcome {
                status: 200,
                body: "{}".to_string(),
            })
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeHistoryCache {
    pub records: Arc<Mutex<BTreeMap<i64, HistoryRecord>>>,
    pub writes: Arc<Mutex<usize>>,
}

impl FakeHistoryCache {
    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        let cache = Self::default();
        {
            let mut map = cache.records.lock().unwrap();
            for record in records {
                map.insert(record.anime_id, record);
            }
        }
        cache
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl HistoryRepository for FakeHistoryCache {
    async fn contains(&self, anime_id: i64) -> Result<bool, HistoryRepositoryError> {
        Ok(self.records.lock().unwrap().contains_key(&anime_id))
    }

    async fn save(&self, record: &HistoryRecord) -> Result<(), HistoryRepositoryError> {
        *self.writes.lock().unwrap() += 1;
        self.records
            .lock()
            .unwrap()
            .insert(record.anime_id, record.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<HistoryRecord>, HistoryRepositoryError> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeTokenStore {
    pub token: Arc<Mutex<Option<Token>>>,
}

impl FakeTokenStore {
    pub fn current(&self) -> Option<Token> {
        self.token.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRepository for FakeTokenStore {
    async fn load(&self) -> Result<Option<Token>, TokenRepositoryError> {
        Ok(self.current())
    }

    async fn save(&self, token: &Token) -> Result<(), TokenRepositoryError> {
        *self.token.lock().unwrap() = Some(token.clone());
        Ok(())
    }
}
