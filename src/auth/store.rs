use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

use super::token::{noop_refresh_callback, RefreshCallback, Token};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpRequest, HttpResponse, RequestBody};

const STATE_LENGTH: usize = 16;

/// Client credentials registered with Hootsuite. Immutable once the client
/// is constructed.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Option<String>,
    pub scope: String,
}

impl Credentials {
    /// Credentials with the default `offline` scope and no redirect URI.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: None,
            scope: "offline".to_string(),
        }
    }

    /// Sets the callback URI registered with Hootsuite.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Overrides the OAuth2 scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

/// What the token endpoint returns for both grant types.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// Error body from the token endpoint (`invalid_grant`, `invalid_client`, ...).
#[derive(Debug, Clone, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Owns the current token and performs the OAuth2 grant exchanges.
///
/// Every successful exchange or refresh replaces the held token and fires
/// the refresh callback exactly once.
pub struct TokenStore<H: HttpClient> {
    http: Arc<H>,
    config: ApiConfig,
    credentials: Credentials,
    token: RwLock<Token>,
    refresh_cb: RefreshCallback,
}

impl<H: HttpClient> TokenStore<H> {
    pub fn new(http: Arc<H>, config: ApiConfig, credentials: Credentials) -> Self {
        Self {
            http,
            config,
            credentials,
            token: RwLock::new(Token::default()),
            refresh_cb: noop_refresh_callback(),
        }
    }

    pub(crate) fn set_config(&mut self, config: ApiConfig) {
        self.config = config;
    }

    pub(crate) fn set_refresh_callback(&mut self, callback: RefreshCallback) {
        self.refresh_cb = callback;
    }

    /// Seeds the store with a previously persisted token.
    pub async fn set_token(&self, token: Token) {
        *self.token.write().await = token;
    }

    /// The last known token.
    pub async fn current_token(&self) -> Token {
        self.token.read().await.clone()
    }

    /// Builds the authorization URL the member must visit, generating an
    /// opaque `state` when none is supplied. Returns `(url, state)`.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<(String, String)> {
        let state = state.map_or_else(random_state, |s| s.to_owned());
        let mut url = Url::parse(&self.config.authorization_url())
            .map_err(|e| Error::AuthExchange(format!("invalid authorization url: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.credentials.client_id)
                .append_pair("scope", &self.credentials.scope)
                .append_pair("state", &state);
            if let Some(redirect_uri) = &self.credentials.redirect_uri {
                pairs.append_pair("redirect_uri", redirect_uri);
            }
        }

        Ok((url.into(), state))
    }

    /// Exchanges an authorization code for a token.
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        let mut form = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code.to_string()),
            ("scope".to_string(), self.credentials.scope.clone()),
        ];
        if let Some(redirect_uri) = &self.credentials.redirect_uri {
            form.push(("redirect_uri".to_string(), redirect_uri.clone()));
        }
        self.grant(form).await
    }

    /// Exchanges the held refresh token for a new token.
    ///
    /// Fails without a network call when no refresh token is held.
    pub async fn refresh(&self) -> Result<Token> {
        let refresh_token = self.token.read().await.refresh_token.clone();
        if refresh_token.is_empty() {
            return Err(Error::AuthExchange("no refresh token available".to_string()));
        }

        tracing::debug!("refreshing access token");
        let form = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), refresh_token),
        ];
        self.grant(form).await
    }

    /// POSTs a grant to the token endpoint with Basic-authenticated client
    /// credentials, stores the result, and fires the refresh callback.
    async fn grant(&self, form: Vec<(String, String)>) -> Result<Token> {
        let mut request = HttpRequest::new(Method::POST, self.config.token_url());
        request.basic_auth = Some((
            self.credentials.client_id.clone(),
            self.credentials.client_secret.clone(),
        ));
        request.body = Some(RequestBody::Form(form));

        let response = self.http.send(request).await?;
        if !response.is_success() {
            return Err(token_endpoint_error(&response));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::AuthExchange(format!("malformed token response: {e}")))?;

        // Some providers omit the refresh token on refresh grants; keep the
        // one already held in that case.
        let previous_refresh = self.token.read().await.refresh_token.clone();
        let token = Token {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token.unwrap_or(previous_refresh),
            expires_in: parsed.expires_in,
            expires_at: Some(Utc::now() + Duration::seconds(parsed.expires_in)),
        };

        *self.token.write().await = token.clone();
        tracing::debug!("token replaced, notifying refresh callback");
        (self.refresh_cb)(&token);

        Ok(token)
    }
}

fn token_endpoint_error(response: &HttpResponse) -> Error {
    match serde_json::from_str::<TokenErrorResponse>(&response.body) {
        Ok(rejection) => {
            let message = match rejection.error_description {
                Some(description) if !description.is_empty() => {
                    format!("{} - {}", rejection.error, description)
                }
                _ => rejection.error,
            };
            Error::AuthExchange(message)
        }
        Err(_) => Error::AuthExchange(format!("{} - {}", response.status, response.body)),
    }
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}
