use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::domain::entities::reorder::UpdateErrorPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "malsort.yml";
pub const CLIENT_ID_VAR: &str = "MALID";
pub const CLIENT_SECRET_VAR: &str = "MALSECRET";

#[derive(Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct MyAnimeListConfig {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl std::fmt::Debug for MyAnimeListConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyAnimeListConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_web_url")]
    pub web_url: String,
    #[serde(default = "default_callback_addr")]
    pub callback_addr: SocketAddr,
    /// Sent as `redirect_uri` when set; otherwise MAL uses the one
    /// registered with the client.
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    #[serde(default)]
    pub on_update_error: UpdateErrorPolicy,
    pub myanimelist: Option<MyAnimeListConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_url: default_api_url(),
            web_url: default_web_url(),
            callback_addr: default_callback_addr(),
            redirect_url: None,
            token_path: default_token_path(),
            cache_path: default_cache_path(),
            on_update_error: UpdateErrorPolicy::default(),
            myanimelist: None,
        }
    }
}

fn default_authorize_url() -> String {
    malsort_tracker::myanimelist::AUTHORIZE_URL.to_string()
}

fn default_token_url() -> String {
    malsort_tracker::myanimelist::TOKEN_URL.to_string()
}

fn default_api_url() -> String {
    malsort_tracker::myanimelist::API_URL.to_string()
}

fn default_web_url() -> String {
    malsort_tracker::myanimelist::WEB_URL.to_string()
}

fn default_callback_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9712))
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("cache")
}

impl Config {
    /// Reads the config at `path`, or `malsort.yml` in the working directory.
    /// A missing default file yields the defaults; a missing explicit one is
    /// an error. Credentials from the environment override the file.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config> {
        let explicit = path.is_some();
        let config_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let mut cfg = match std::fs::File::open(&config_path) {
            Ok(file) => {
                info!("Open config from {:?}", config_path);
                let mut cfg: Self = serde_yml::from_reader(file)
                    .with_context(|| format!("invalid config {}", config_path.display()))?;
                cfg.path = Some(config_path);
                cfg
            }
            Err(e) if explicit => {
                return Err(anyhow!("cannot open config {}: {e}", config_path.display()));
            }
            Err(_) => {
                debug!("no config at {:?}, using defaults", config_path);
                Config::default()
            }
        };

        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = var(CLIENT_ID_VAR).filter(|v| !v.is_empty());
        let client_secret = var(CLIENT_SECRET_VAR);

        if client_id.is_none() && client_secret.is_none() {
            return;
        }

        let mal = self.myanimelist.get_or_insert_with(Default::default);
        if let Some(client_id) = client_id {
            mal.client_id = client_id;
        }
        if let Some(client_secret) = client_secret {
            mal.client_secret = client_secret;
        }
    }

    /// Client credentials, required for authorization and token refresh.
    pub fn credentials(&self) -> Result<&MyAnimeListConfig> {
        self.myanimelist
            .as_ref()
            .filter(|mal| !mal.client_id.is_empty())
            .ok_or_else(|| anyhow!("{CLIENT_ID_VAR} is not set"))
    }
}
