use async_trait::async_trait;
use malsort_tracker::{HistoryRecord, MyAnimeList, Session, Token};

use crate::domain::{
    entities::{
        catalog::CatalogEntry,
        reorder::{ListStatusUpdate, UpdateOutcome},
    },
    repositories::tracker::{CatalogPage, TrackerRepository, TrackerRepositoryError},
};

#[derive(Debug, Clone)]
pub struct TrackerRepositoryImpl {
    client: MyAnimeList,
}

impl TrackerRepositoryImpl {
    pub fn new(client: MyAnimeList) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TrackerRepository for TrackerRepositoryImpl {
    fn get_authorize_url(&self) -> Result<Session, TrackerRepositoryError> {
        Ok(self.client.get_authorize_url())
    }

    async fn exchange_code(
        &self,
        code: String,
        pkce_code_verifier: String,
    ) -> Result<Token, TrackerRepositoryError> {
        Ok(self.client.exchange_code(code, pkce_code_verifier).await?)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, TrackerRepositoryError> {
        Ok(self.client.refresh_token(refresh_token.to_string()).await?)
    }

    async fn fetch_total_count(&self, token: &Token) -> Result<i64, TrackerRepositoryError> {
        let stats = self.client.get_user_stats(&token.access_token).await?;
        Ok(stats.anime_statistics.num_items)
    }

    async fn fetch_catalog_page(
        &self,
        token: &Token,
        next: Option<&str>,
    ) -> Result<CatalogPage, TrackerRepositoryError> {
        let page = self
            .client
            .get_anime_list_page(&token.access_token, next)
            .await?;

        Ok(CatalogPage {
            entries: page.data.into_iter().map(CatalogEntry::from).collect(),
            next: page.paging.next,
        })
    }

    async fn fetch_update_history(
        &self,
        token: &Token,
        anime_id: i64,
    ) -> Result<HistoryRecord, TrackerRepositoryError> {
        Ok(self
            .client
            .get_anime_update_history(&token.access_token, anime_id)
            .await?)
    }

    async fn update_list_status(
        &self,
        token: &Token,
        anime_id: i64,
        update: &ListStatusUpdate,
    ) -> Result<UpdateOutcome, TrackerRepositoryError> {
        let res = self
            .client
            .update_my_list_status(&token.access_token, anime_id, update)
            .await?;

        Ok(UpdateOutcome {
            status: res.status.as_u16(),
            body: res.body,
        })
    }
}
