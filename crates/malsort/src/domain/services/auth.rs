use malsort_tracker::{Session, Token};
use thiserror::Error;

use crate::domain::repositories::{
    token::{TokenRepository, TokenRepositoryError},
    tracker::{TrackerRepository, TrackerRepositoryError},
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("tracker error: {0}")]
    TrackerError(#[from] TrackerRepositoryError),
    #[error("token store error: {0}")]
    TokenError(#[from] TokenRepositoryError),
    #[error("authorization state does not match the session")]
    StateMismatch,
    #[error("no pkce code verifier")]
    NoVerifier,
    #[error("token has no refresh token")]
    NoRefreshToken,
}

pub struct AuthService<R, S>
where
    R: TrackerRepository,
    S: TokenRepository,
{
    tracker: R,
    store: S,
}

impl<R, S> AuthService<R, S>
where
    R: TrackerRepository,
    S: TokenRepository,
{
    pub fn new(tracker: R, store: S) -> Self {
        Self { tracker, store }
    }

    pub async fn load_token(&self) -> Result<Option<Token>, AuthError> {
        Ok(self.store.load().await?)
    }

    pub fn login_start(&self) -> Result<Session, AuthError> {
        Ok(self.tracker.get_authorize_url()?)
    }

    /// Exchanges the code received on the redirect and persists the token.
    pub async fn login_end(
        &self,
        code: String,
        state: Option<String>,
        session: Session,
    ) -> Result<Token, AuthError> {
        match state {
            Some(state) if state != *session.csrf_state.secret() => {
                return Err(AuthError::StateMismatch);
            }
            Some(_) => {}
            None => warn!("authorization redirect carried no state"),
        }

        let pkce_code_verifier = session.pkce_code_verifier.ok_or(AuthError::NoVerifier)?;
        let token = self
            .tracker
            .exchange_code(code, pkce_code_verifier.secret().to_owned())
            .await?;

        self.store.save(&token).await?;
        info!("token saved");

        Ok(token)
    }

    pub async fn refresh(&self, token: &Token) -> Result<Token, AuthError> {
        if token.refresh_token.is_empty() {
            return Err(AuthError::NoRefreshToken);
        }

        let token = self.tracker.refresh_token(&token.refresh_token).await?;
        self.store.save(&token).await?;
        info!("refreshed token saved");

        Ok(token)
    }
}
