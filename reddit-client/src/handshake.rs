use crate::auth::{AuthorizationRequest, RedditClient, RedditToken};
use crate::callback::{CallbackListener, CallbackParams};
use newsdesk_core::CoreError;
use tracing::{info, warn};
use url::Url;

/// Shows the authorization URL to whoever runs the handshake.
pub trait AuthUrlPresenter {
    fn present(&self, url: &Url);
}

/// Prints the URL and optionally opens it in the default browser.
pub struct ConsolePresenter {
    open_browser: bool,
}

impl ConsolePresenter {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl AuthUrlPresenter for ConsolePresenter {
    fn present(&self, url: &Url) {
        println!("🔗 Visit this URL and authorize access:\n{}\n", url);
        if self.open_browser {
            if let Err(e) = webbrowser::open(url.as_str()) {
                warn!("Could not open a browser ({}), open the URL manually", e);
            }
        }
    }
}

/// Runs the authorization-code grant end to end: build, present, capture,
/// exchange.
pub async fn run_handshake<P>(
    client: &mut RedditClient,
    request: &AuthorizationRequest,
    presenter: &P,
    listener: CallbackListener,
) -> Result<RedditToken, CoreError>
where
    P: AuthUrlPresenter + ?Sized,
{
    let url = client.authorization_url(request);
    presenter.present(&url);
    client.mark_awaiting_redirect();

    match listener.local_addr() {
        Ok(addr) => info!("🌐 Waiting for Reddit callback on {}...", addr),
        Err(_) => info!("🌐 Waiting for Reddit callback..."),
    }

    let params = match listener.wait_for_redirect().await {
        Ok(params) => params,
        Err(e) => {
            client.mark_failed(e.to_string());
            return Err(e);
        }
    };

    let code = client.handle_callback(&params)?;
    client.exchange_code(&code).await
}

/// Finishes a handshake from a redirect URL copied out of the browser, for
/// machines where the redirect port cannot be reached. The authorization URL
/// must already have been built and presented.
pub async fn complete_pasted_redirect(
    client: &mut RedditClient,
    callback_url: &str,
) -> Result<RedditToken, CoreError> {
    let callback_url = callback_url.trim();
    if !callback_url.starts_with(&client.config().redirect_uri) {
        warn!(
            "Pasted URL does not start with the redirect URI {}",
            client.config().redirect_uri
        );
    }

    let params = match CallbackParams::from_url(callback_url) {
        Ok(params) => params,
        Err(e) => {
            client.mark_failed(e.to_string());
            return Err(e);
        }
    };

    let code = client.handle_callback(&params)?;
    client.exchange_code(&code).await
}
