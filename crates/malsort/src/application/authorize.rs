use malsort_tracker::Token;
use thiserror::Error;

use crate::{
    domain::{
        repositories::{token::TokenRepository, tracker::TrackerRepository},
        services::auth::{AuthError, AuthService},
    },
    presentation::callback::{CallbackError, CallbackListener},
};

#[derive(Debug, Error)]
pub enum AuthorizeError {
    #[error("authorization redirect failed: {0}")]
    Callback(#[from] CallbackError),
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),
}

/// Runs the authorization-code flow once: prints the authorize URL, waits
/// for the redirect on `listener`, exchanges the code and saves the token.
///
/// Nothing is saved unless the redirect carries a code.
pub async fn authorize<R, S>(
    svc: &AuthService<R, S>,
    listener: CallbackListener,
) -> Result<Token, AuthorizeError>
where
    R: TrackerRepository,
    S: TokenRepository,
{
    let session = svc.login_start()?;
    println!(
        "Authorise MyAnimeList account by clicking URL: {}\n",
        session.authorize_url
    );

    let params = listener.wait().await?;
    let token = svc.login_end(params.code, params.state, session).await?;

    Ok(token)
}
