use anyhow::anyhow;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, RefreshToken, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenResponse},
    reqwest::async_http_client,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{Error, HistoryRecord, Session, Token, history};

pub const AUTHORIZE_URL: &str = "https://myanimelist.net/v1/oauth2/authorize";
pub const TOKEN_URL: &str = "https://myanimelist.net/v1/oauth2/token";
pub const API_URL: &str = "https://api.myanimelist.net/v2";
pub const WEB_URL: &str = "https://myanimelist.net";

/// Page size of the list endpoint; 100 is the largest value the API accepts.
pub const PAGE_LIMIT: usize = 100;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainPicture {
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AnimeNode {
    pub id: i64,
    pub title: String,
    pub main_picture: Option<MainPicture>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MyListStatus {
    pub status: Option<String>,
    pub score: i64,
    pub num_episodes_watched: Option<i64>,
    pub is_rewatching: Option<bool>,
    pub updated_at: Option<String>,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimeListItem {
    pub node: AnimeNode,
    #[serde(default)]
    pub list_status: MyListStatus,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub previous: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimeListPage {
    pub data: Vec<AnimeListItem>,
    #[serde(default)]
    pub paging: Paging,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AnimeStatistics {
    pub num_items_watching: i64,
    pub num_items_completed: i64,
    pub num_items_on_hold: i64,
    pub num_items_dropped: i64,
    pub num_items_plan_to_watch: i64,
    pub num_items: i64,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub id: i64,
    pub name: String,
    pub anime_statistics: AnimeStatistics,
}

/// Raw answer of a list status PATCH. The status is not checked here.
#[derive(Debug, Clone)]
pub struct UpdateResponse {
    pub status: StatusCode,
    pub body: String,
}

impl UpdateResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone)]
pub struct MyAnimeList {
    pub oauth_client: BasicClient,
    api_client: reqwest::Client,
    api_url: String,
    web_url: String,
}

impl MyAnimeList {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_url: Option<String>,
    ) -> Result<Self, Error> {
        Self::with_oauth_urls(
            client_id,
            client_secret,
            redirect_url,
            AUTHORIZE_URL,
            TOKEN_URL,
        )
    }

    /// Same as [`MyAnimeList::new`] with other authorization and token endpoints.
    pub fn with_oauth_urls(
        client_id: String,
        client_secret: String,
        redirect_url: Option<String>,
        authorize_url: &str,
        token_url: &str,
    ) -> Result<Self, Error> {
        let client_id = ClientId::new(client_id);
        let client_secret = (!client_secret.is_empty()).then(|| ClientSecret::new(client_secret));
        let authorization_url =
            AuthUrl::new(authorize_url.to_string()).map_err(|e| anyhow!("{e}"))?;
        let token_url = TokenUrl::new(token_url.to_string()).map_err(|e| anyhow!("{e}"))?;

        // MAL expects the client credentials in the form body, not basic auth.
        let mut client =
            BasicClient::new(client_id, client_secret, authorization_url, Some(token_url))
                .set_auth_type(AuthType::RequestBody);
        if let Some(redirect_url) = redirect_url {
            let redirect_url = RedirectUrl::new(redirect_url).map_err(|e| anyhow!("{e}"))?;
            client = client.set_redirect_uri(redirect_url);
        }

        Ok(Self {
            oauth_client: client,
            api_client: reqwest::Client::new(),
            api_url: API_URL.to_string(),
            web_url: WEB_URL.to_string(),
        })
    }

    /// Points the REST and HTML calls at other hosts, e.g. a local mock.
    pub fn with_base_urls(mut self, api_url: &str, web_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.web_url = web_url.trim_end_matches('/').to_string();
        self
    }

    pub fn get_authorize_url(&self) -> Session {
        // MAL only implements the plain challenge method.
        let (pkce_code_challenge, pkce_code_verifier) = PkceCodeChallenge::new_random_plain();
        let (authorize_url, csrf_state) = self
            .oauth_client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_code_challenge)
            .url();

        Session {
            authorize_url: authorize_url.to_string(),
            csrf_state,
            pkce_code_verifier: Some(pkce_code_verifier),
        }
    }

    pub async fn exchange_code(
        &self,
        code: String,
        pkce_code_verifier: String,
    ) -> Result<Token, Error> {
        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_code_verifier))
            .request_async(async_http_client)
            .await
            .map_err(|e| anyhow!("token exchange failed: {e}"))?;

        info!("token generated successfully");
        Ok(into_token(token))
    }

    pub async fn refresh_token(&self, refresh_token: String) -> Result<Token, Error> {
        let token = self
            .oauth_client
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .request_async(async_http_client)
            .await
            .map_err(|e| anyhow!("token refresh failed: {e}"))?;

        info!("token refreshed");
        Ok(into_token(token))
    }

    pub async fn get_user_stats(&self, token: &str) -> Result<UserStats, Error> {
        let url = format!("{}/users/@me?fields=anime_statistics", self.api_url);
        Ok(self.get(token, &url).await?.json().await?)
    }

    /// Fetches one page of the user's list. `next` is the `paging.next` link
    /// of the previous page; `None` requests the first page.
    pub async fn get_anime_list_page(
        &self,
        token: &str,
        next: Option<&str>,
    ) -> Result<AnimeListPage, Error> {
        let url = match next {
            Some(next) => next.to_string(),
            None => format!(
                "{}/users/@me/animelist?fields=list_status&limit={PAGE_LIMIT}&nsfw=true",
                self.api_url
            ),
        };

        Ok(self.get(token, &url).await?.json().await?)
    }

    pub async fn get_anime_update_history(
        &self,
        token: &str,
        anime_id: i64,
    ) -> Result<HistoryRecord, Error> {
        let url = format!(
            "{}/ajaxtb.php?keepThis=true&detailedaid={anime_id}",
            self.web_url
        );
        let html = self.get(token, &url).await?.text().await?;

        history::parse_update_history(&html, anime_id)
    }

    /// Sends `params` as a form body. Non-2xx answers are returned, not raised.
    pub async fn update_my_list_status<T: Serialize + ?Sized>(
        &self,
        token: &str,
        anime_id: i64,
        params: &T,
    ) -> Result<UpdateResponse, Error> {
        let res = self
            .api_client
            .patch(format!("{}/anime/{anime_id}/my_list_status", self.api_url))
            .bearer_auth(token)
            .form(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!("PATCH {anime_id} => {status} {body}");

        Ok(UpdateResponse { status, body })
    }

    async fn get(&self, token: &str, url: &str) -> Result<reqwest::Response, Error> {
        debug!("GET {url}");
        let res = self.api_client.get(url).bearer_auth(token).send().await?;

        match res.status() {
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            status if !status.is_success() => Err(Error::Status(status)),
            _ => Ok(res),
        }
    }
}

fn into_token(token: BasicTokenResponse) -> Token {
    Token {
        token_type: token.token_type().as_ref().to_string(),
        expires_in: token
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default(),
        access_token: token.access_token().secret().to_owned(),
        refresh_token: token
            .refresh_token()
            .map(|t| t.secret().to_owned())
            .unwrap_or_default(),
    }
}
