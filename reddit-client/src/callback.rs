//! One-shot listener for the OAuth redirect.
//!
//! The listener answers the first request it receives, hands that request's
//! query parameters back to the caller and shuts down.

use axum::extract::State;
use axum::http::Uri;
use axum::Router;
use newsdesk_core::{CoreError, RedditApiError};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

pub const CLOSE_WINDOW_BODY: &str = "You may now close this window.";

/// Query parameters Reddit appends to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parses a raw query string; the first occurrence of each key wins.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Parses a full callback URL as pasted from a browser address bar.
    pub fn from_url(callback_url: &str) -> Result<Self, CoreError> {
        let url = Url::parse(callback_url).map_err(|e| CoreError::InvalidInput {
            message: format!("callback URL '{}': {}", callback_url, e),
        })?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }
}

#[derive(Clone)]
struct RedirectSlot {
    sender: Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>,
}

async fn capture_redirect(State(slot): State<RedirectSlot>, uri: Uri) -> &'static str {
    let params = CallbackParams::from_query(uri.query().unwrap_or_default());
    let sender = slot.sender.lock().ok().and_then(|mut guard| guard.take());

    match sender {
        Some(sender) => {
            debug!("Captured redirect on {}", uri.path());
            if sender.send(params).is_err() {
                warn!("Redirect arrived after the handshake stopped waiting");
            }
        }
        None => debug!("Ignoring extra request to {}", uri.path()),
    }

    CLOSE_WINDOW_BODY
}

pub struct CallbackListener {
    listener: TcpListener,
}

impl CallbackListener {
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, CoreError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RedditApiError::CallbackFailed {
                reason: format!("could not bind listener: {}", e),
            })?;
        Ok(Self { listener })
    }

    /// Binds to the host and port of a registered redirect URI, e.g.
    /// `http://localhost:8080`.
    pub async fn bind_redirect_uri(redirect_uri: &str) -> Result<Self, CoreError> {
        let url = Url::parse(redirect_uri).map_err(|e| CoreError::InvalidInput {
            message: format!("redirect URI '{}': {}", redirect_uri, e),
        })?;
        let host = url.host_str().ok_or_else(|| CoreError::InvalidInput {
            message: format!("redirect URI '{}' has no host", redirect_uri),
        })?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| CoreError::InvalidInput {
                message: format!("redirect URI '{}' has no port", redirect_uri),
            })?;

        Self::bind((host, port)).await
    }

    pub fn local_addr(&self) -> Result<SocketAddr, CoreError> {
        Ok(self.listener.local_addr()?)
    }

    /// Blocks until the first request arrives, answers it with
    /// [`CLOSE_WINDOW_BODY`] and returns its query parameters.
    pub async fn wait_for_redirect(self) -> Result<CallbackParams, CoreError> {
        let (params_tx, params_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let slot = RedirectSlot {
            sender: Arc::new(Mutex::new(Some(params_tx))),
        };
        let app = Router::new().fallback(capture_redirect).with_state(slot);

        let listener = self.listener;
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await
        });

        let params = params_rx.await.map_err(|_| RedditApiError::CallbackFailed {
            reason: "listener stopped before a redirect arrived".to_string(),
        })?;
        info!("📬 Redirect received");

        let _ = stop_tx.send(());
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Redirect listener shut down with an error: {}", e),
            Err(e) => warn!("Redirect listener task failed: {}", e),
        }

        Ok(params)
    }
}
