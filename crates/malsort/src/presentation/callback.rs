use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

pub const CALLBACK_PATH: &str = "/callback";

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No OAUTH code was returned by MAL: {0}")]
    MissingCode(String),
    #[error("callback listener stopped before the redirect arrived")]
    Closed,
}

/// What the identity provider sent back on the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

type ResultSender = Arc<Mutex<Option<oneshot::Sender<Result<CallbackParams, CallbackError>>>>>;

async fn handle_callback(
    State(tx): State<ResultSender>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> impl IntoResponse {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => CallbackQuery {
            error_description: Some(rejection.body_text()),
            ..Default::default()
        },
    };

    let (result, response) = match query.code {
        Some(code) => (
            Ok(CallbackParams {
                code,
                state: query.state,
            }),
            (
                StatusCode::OK,
                Html("Authorization received, you can close this window."),
            ),
        ),
        None => {
            let reason = query
                .error_description
                .or(query.error)
                .unwrap_or_else(|| "redirect has no code parameter".to_string());
            (
                Err(CallbackError::MissingCode(reason)),
                (
                    StatusCode::BAD_REQUEST,
                    Html("No OAUTH code was returned by MAL."),
                ),
            )
        }
    };

    let sender = tx.lock().ok().and_then(|mut guard| guard.take());
    match sender {
        Some(sender) => {
            let _ = sender.send(result);
        }
        None => debug!("authorization already handled, ignoring callback"),
    }

    response
}

/// Short-lived HTTP listener that receives the authorization redirect.
pub struct CallbackListener {
    local_addr: SocketAddr,
    result_rx: oneshot::Receiver<Result<CallbackParams, CallbackError>>,
    shutdown_tx: oneshot::Sender<()>,
    server: JoinHandle<std::io::Result<()>>,
}

impl CallbackListener {
    pub async fn bind(addr: SocketAddr) -> Result<Self, CallbackError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route(CALLBACK_PATH, get(handle_callback))
            .with_state(Arc::new(Mutex::new(Some(result_tx))));

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("waiting for authorization redirect on http://{local_addr}{CALLBACK_PATH}");

        Ok(Self {
            local_addr,
            result_rx,
            shutdown_tx,
            server,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Blocks until the first redirect arrives, then stops the listener.
    pub async fn wait(self) -> Result<CallbackParams, CallbackError> {
        let Self {
            result_rx,
            shutdown_tx,
            mut server,
            ..
        } = self;

        let result = result_rx.await.map_err(|_| CallbackError::Closed);
        let _ = shutdown_tx.send(());

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut server).await {
            Ok(Ok(Ok(()))) => debug!("callback listener stopped"),
            Ok(Ok(Err(e))) => warn!("callback listener failed: {e}"),
            Ok(Err(e)) => warn!("callback listener task failed: {e}"),
            Err(_) => {
                warn!("callback listener did not stop in time, aborting");
                server.abort();
            }
        }

        result?
    }
}
