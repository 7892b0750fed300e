#[macro_use]
extern crate log;

pub mod history;
pub use history::HistoryRecord;

pub mod myanimelist;
pub use myanimelist::MyAnimeList;

pub use oauth2::{CsrfToken, PkceCodeVerifier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unauthorized")]
    Unauthorized,
    #[error("request returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected page layout: {0} not found")]
    Layout(&'static str),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct Session {
    pub authorize_url: String,
    pub csrf_state: CsrfToken,
    pub pkce_code_verifier: Option<PkceCodeVerifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}
