// ABOUTME: OAuth2 token provider for the Oura API
// ABOUTME: Authorize-URL construction, code-for-token exchange, and refresh-token renewal
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Token Provider
//!
//! [`AuthClient`] wraps the Oura OAuth2 authorization-code flow: it builds
//! the authorization URL, exchanges a user-approved code for a [`Token`],
//! and renews tokens with `grant_type=refresh_token`.
//!
//! Token persistence stays with the caller: pass a [`TokenSink`] to a client
//! constructor and it is invoked synchronously with every freshly issued
//! [`Token`]. Personal access tokens bypass this module entirely.

use crate::errors::{OuraError, Result};
use crate::utils::http_client::oauth_client;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default Oura authorization endpoint.
const AUTHORIZE_URL: &str = "https://cloud.ouraring.com/oauth/authorize";

/// Default Oura token endpoint.
const TOKEN_URL: &str = "https://api.ouraring.com/oauth/token";

/// The full scope set, requested when the caller does not narrow it.
const ALL_SCOPES: &str = "email personal daily heartrate workout tag session spo2";

/// How close to expiry a token is still treated as usable.
const EXPIRY_BUFFER_MINUTES: i64 = 5;

/// A token issued by the Oura token endpoint.
///
/// Produced on authorization-code exchange or refresh; never mutated in
/// place, each refresh yields a new value. This is also the exact shape
/// handed to a [`TokenSink`] (`expires_in` in seconds, `expires_at` in
/// epoch seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token type, `"bearer"` for Oura.
    pub token_type: String,
    /// The bearer credential attached to API requests.
    pub access_token: String,
    /// Credential for obtaining the next access token, when issued.
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    /// Absolute expiry as epoch seconds.
    pub expires_at: i64,
}

impl Token {
    /// Expiry as a UTC timestamp, `None` when `expires_at` is out of range.
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}

/// Caller-supplied persistence capability, invoked synchronously with each
/// newly issued [`Token`]. The return value is ignored; persistence failures
/// are the caller's concern.
pub trait TokenSink: Send + Sync {
    /// Persist a freshly issued token.
    fn persist(&self, token: &Token);
}

impl<F> TokenSink for F
where
    F: Fn(&Token) + Send + Sync,
{
    fn persist(&self, token: &Token) {
        self(token);
    }
}

/// Client-held OAuth2 credential state.
///
/// `access_token`, `refresh_token`, and `expires_at` are replaced as a unit
/// on every refresh. `expires_at` of `None` means the expiry is unknown; the
/// token is then used as-is until the API rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Credentials {
    /// OAuth client ID registered with Oura.
    pub client_id: String,
    /// OAuth client secret; absent in the short-lived construction form,
    /// which makes the credentials unrefreshable.
    pub client_secret: Option<String>,
    /// Current access token.
    pub access_token: Option<String>,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl OAuth2Credentials {
    /// Build credentials from a previously persisted [`Token`], as handed to
    /// a [`TokenSink`]. Reconstructing a client from this value reproduces
    /// an equivalent authenticated client.
    #[must_use]
    pub fn from_token(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        token: &Token,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            access_token: Some(token.access_token.clone()),
            refresh_token: token.refresh_token.clone(),
            expires_at: token.expires_at_utc(),
        }
    }

    /// Replace the token triple with a freshly issued token. A refresh
    /// response that omits the refresh token keeps the previous one.
    pub fn apply(&mut self, token: &Token) {
        self.access_token = Some(token.access_token.clone());
        if token.refresh_token.is_some() {
            self.refresh_token = token.refresh_token.clone();
        }
        self.expires_at = token.expires_at_utc();
    }

    /// Whether the access token is expired (or within the expiry buffer).
    /// Unknown expiry counts as not expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| Utc::now() + Duration::minutes(EXPIRY_BUFFER_MINUTES) > at)
    }
}

/// OAuth endpoint configuration, overridable for tests.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Authorization endpoint presented to the user.
    pub authorize_url: String,
    /// Token endpoint for code exchange and refresh.
    pub token_url: String,
    /// Scopes requested when the caller does not supply any.
    pub default_scopes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_URL.to_owned(),
            token_url: TOKEN_URL.to_owned(),
            default_scopes: ALL_SCOPES.split(' ').map(str::to_owned).collect(),
        }
    }
}

/// Token endpoint response shape.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    token_type: Option<String>,
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// OAuth2 authorization-code flow client.
pub struct AuthClient {
    client_id: String,
    client_secret: Option<String>,
    config: AuthConfig,
    http: Client,
}

impl AuthClient {
    /// Create an auth client against the production Oura endpoints.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self::with_config(client_id, client_secret, AuthConfig::default())
    }

    /// Create an auth client with custom endpoint configuration.
    #[must_use]
    pub fn with_config(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        config: AuthConfig,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            config,
            http: oauth_client(),
        }
    }

    /// Build the authorization URL the user must visit.
    ///
    /// Pure construction, no side effects. `scopes` of `None` requests the
    /// configured default scope set (all scopes unless narrowed in
    /// [`AuthConfig`]), resolved here at call time.
    #[must_use]
    pub fn authorize_url(
        &self,
        scopes: Option<&[&str]>,
        redirect_uri: &str,
        state: Option<&str>,
    ) -> String {
        let scope = scopes.map_or_else(
            || self.config.default_scopes.join(" "),
            |scopes| scopes.join(" "),
        );

        let mut url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.config.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
        );
        if let Some(state) = state {
            url.push_str("&state=");
            url.push_str(&urlencoding::encode(state));
        }
        url
    }

    /// Exchange an authorization code for a [`Token`].
    pub async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> Result<Token> {
        info!("Exchanging authorization code for Oura tokens");

        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(secret) = self.client_secret.as_deref() {
            params.push(("client_secret", secret));
        }
        if let Some(redirect_uri) = redirect_uri {
            params.push(("redirect_uri", redirect_uri));
        }

        self.token_request(&params).await
    }

    /// Renew an access token with `grant_type=refresh_token`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        info!("Refreshing Oura access token");

        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(secret) = self.client_secret.as_deref() {
            params.push(("client_secret", secret));
        }

        self.token_request(&params).await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<Token> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|source| OuraError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OuraError::auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        debug!("Parsing token endpoint response");
        let issued: TokenEndpointResponse = response.json().await.map_err(|e| {
            OuraError::auth(format!("failed to parse token endpoint response: {e}"))
        })?;

        Ok(Token {
            token_type: issued.token_type.unwrap_or_else(|| "bearer".to_owned()),
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
            expires_in: issued.expires_in,
            expires_at: Utc::now().timestamp() + issued.expires_in,
        })
    }
}
