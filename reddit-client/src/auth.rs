use crate::callback::CallbackParams;
use newsdesk_core::{CoreError, RedditApiError, RedditCredentials};
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, HttpRequest, HttpResponse,
    RedirectUrl, RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

pub const REDDIT_AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub user_agent: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl RedditOAuth2Config {
    pub fn new(
        client_id: String,
        client_secret: Option<String>,
        redirect_uri: String,
        user_agent: String,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            user_agent,
            authorize_url: REDDIT_AUTHORIZE_URL.to_string(),
            token_url: REDDIT_TOKEN_URL.to_string(),
        }
    }

    pub fn from_credentials(credentials: &RedditCredentials) -> Self {
        Self::new(
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            credentials
                .redirect_uri
                .clone()
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            credentials.user_agent.clone(),
        )
    }

    /// Points the client at different OAuth endpoints.
    pub fn with_endpoints(mut self, authorize_url: String, token_url: String) -> Self {
        self.authorize_url = authorize_url;
        self.token_url = token_url;
        self
    }
}

/// How long the granted token should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenDuration {
    /// One-hour access token, no refresh token.
    Temporary,
    /// Access token plus a non-expiring refresh token.
    #[default]
    Permanent,
}

impl TokenDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenDuration::Temporary => "temporary",
            TokenDuration::Permanent => "permanent",
        }
    }
}

impl fmt::Display for TokenDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "temporary" | "session" => Ok(TokenDuration::Temporary),
            "permanent" | "non-expiring" => Ok(TokenDuration::Permanent),
            other => Err(format!(
                "unknown token duration '{}', expected temporary or permanent",
                other
            )),
        }
    }
}

/// What the operator is asked to grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub scopes: Vec<String>,
    pub state: String,
    pub duration: TokenDuration,
}

impl AuthorizationRequest {
    pub fn new(scopes: Vec<String>, state: impl Into<String>, duration: TokenDuration) -> Self {
        Self {
            scopes,
            state: state.into(),
            duration,
        }
    }

    pub fn with_random_state(scopes: Vec<String>, duration: TokenDuration) -> Self {
        Self::new(scopes, uuid::Uuid::new_v4().simple().to_string(), duration)
    }

    pub fn default_scopes() -> Vec<String> {
        vec!["identity".to_string(), "read".to_string()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Vec<String>,
}

impl From<BasicTokenResponse> for RedditToken {
    fn from(response: BasicTokenResponse) -> Self {
        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            scope: response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        }
    }
}

/// Progress of the authorization-code handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    NotStarted,
    Built { state: String },
    AwaitingRedirect { state: String },
    CodeReceived,
    Complete,
    Failed { reason: String },
}

#[derive(Debug)]
pub struct RedditClient {
    config: RedditOAuth2Config,
    oauth_client: BasicClient,
    http_client: reqwest::Client,
    handshake: HandshakeState,
}

impl RedditClient {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(config.authorize_url.clone()).map_err(|e| {
            CoreError::InvalidInput {
                message: format!("authorize URL '{}': {}", config.authorize_url, e),
            }
        })?;
        let token_url =
            TokenUrl::new(config.token_url.clone()).map_err(|e| CoreError::InvalidInput {
                message: format!("token URL '{}': {}", config.token_url, e),
            })?;
        let redirect_url =
            RedirectUrl::new(config.redirect_uri.clone()).map_err(|e| CoreError::InvalidInput {
                message: format!("redirect URI '{}': {}", config.redirect_uri, e),
            })?;

        // Reddit wants basic auth on the token endpoint even for installed
        // apps, where the password is empty.
        let client_secret = ClientSecret::new(config.client_secret.clone().unwrap_or_default());

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(client_secret),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            config,
            oauth_client,
            http_client,
            handshake: HandshakeState::NotStarted,
        })
    }

    pub fn config(&self) -> &RedditOAuth2Config {
        &self.config
    }

    pub fn handshake_state(&self) -> &HandshakeState {
        &self.handshake
    }

    /// Builds the URL the operator opens to grant access.
    pub fn authorization_url(&mut self, request: &AuthorizationRequest) -> Url {
        let state = request.state.clone();
        let (url, _) = self
            .oauth_client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(request.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("duration", request.duration.as_str())
            .url();

        debug!("Built authorization URL for scopes {:?}", request.scopes);
        self.handshake = HandshakeState::Built {
            state: request.state.clone(),
        };
        url
    }

    pub fn mark_awaiting_redirect(&mut self) {
        if let HandshakeState::Built { state } = &self.handshake {
            self.handshake = HandshakeState::AwaitingRedirect {
                state: state.clone(),
            };
        }
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.handshake = HandshakeState::Failed {
            reason: reason.into(),
        };
    }

    /// Validates the redirect and returns the authorization code.
    ///
    /// The redirect must echo the state sent in the authorization URL;
    /// nothing is exchanged otherwise.
    pub fn handle_callback(&mut self, params: &CallbackParams) -> Result<String, CoreError> {
        let expected_state = match &self.handshake {
            HandshakeState::Built { state } | HandshakeState::AwaitingRedirect { state } => {
                state.clone()
            }
            other => {
                return Err(RedditApiError::AuthenticationFailed {
                    reason: format!("No authorization in progress ({:?})", other),
                }
                .into())
            }
        };

        if let Some(reason) = &params.error {
            self.mark_failed(reason.clone());
            return Err(RedditApiError::AuthenticationFailed {
                reason: reason.clone(),
            }
            .into());
        }

        if params.state.as_deref() != Some(expected_state.as_str()) {
            self.mark_failed("CSRF token mismatch");
            return Err(RedditApiError::AuthenticationFailed {
                reason: "CSRF token mismatch".to_string(),
            }
            .into());
        }

        match &params.code {
            Some(code) if !code.is_empty() => {
                self.handshake = HandshakeState::CodeReceived;
                Ok(code.clone())
            }
            _ => {
                self.mark_failed("no authorization code in redirect");
                Err(RedditApiError::MissingAuthorizationCode.into())
            }
        }
    }

    /// Trades an authorization code for tokens.
    pub async fn exchange_code(&mut self, code: &str) -> Result<RedditToken, CoreError> {
        info!("Exchanging authorization code for tokens");
        let http = self.http_client.clone();
        let result = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(move |request| send_token_request(http, request))
            .await;

        match result {
            Ok(response) => {
                self.handshake = HandshakeState::Complete;
                let token = RedditToken::from(response);
                info!("Authorization complete, granted scopes {:?}", token.scope);
                Ok(token)
            }
            Err(e) => {
                let err = token_error(e);
                self.mark_failed(err.to_string());
                Err(err)
            }
        }
    }

    /// App-only token via the client-credentials grant.
    pub async fn client_credentials_token(&self) -> Result<RedditToken, CoreError> {
        debug!("Requesting app-only access token");
        let http = self.http_client.clone();
        self.oauth_client
            .exchange_client_credentials()
            .request_async(move |request| send_token_request(http, request))
            .await
            .map(RedditToken::from)
            .map_err(token_error)
    }

    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<RedditToken, CoreError> {
        debug!("Refreshing access token");
        let http = self.http_client.clone();
        let refresh = RefreshToken::new(refresh_token.to_string());
        self.oauth_client
            .exchange_refresh_token(&refresh)
            .request_async(move |request| send_token_request(http, request))
            .await
            .map(RedditToken::from)
            .map_err(token_error)
    }

    /// Access token for listing reads: refresh grant when a refresh token is
    /// configured, app-only otherwise.
    pub async fn api_access_token(&self, refresh_token: Option<&str>) -> Result<String, CoreError> {
        let token = match refresh_token {
            Some(refresh) => self.refresh_access_token(refresh).await?,
            None => self.client_credentials_token().await?,
        };
        Ok(token.access_token)
    }
}

async fn send_token_request(
    http: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http
        .request(request.method, request.url)
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn token_error(err: RequestTokenError<reqwest::Error, BasicErrorResponse>) -> CoreError {
    match err {
        RequestTokenError::ServerResponse(response) => {
            error!("Token endpoint rejected the request: {}", response.error());
            RedditApiError::AuthenticationFailed {
                reason: response.error().to_string(),
            }
            .into()
        }
        RequestTokenError::Request(e) if e.is_timeout() => RedditApiError::RequestTimeout.into(),
        RequestTokenError::Request(e) => CoreError::Network(e),
        RequestTokenError::Parse(e, body) => RedditApiError::InvalidResponse {
            details: format!(
                "unreadable token response ({}): {}",
                e,
                String::from_utf8_lossy(&body)
            ),
        }
        .into(),
        RequestTokenError::Other(reason) => RedditApiError::AuthenticationFailed { reason }.into(),
    }
}
