// ABOUTME: Shared API client plumbing for both Oura API generations
// ABOUTME: Query windows, auth mode handling, and the refresh-and-retry-once request pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # API Clients
//!
//! Two concrete clients cover the two API generations: [`OuraClient`] for
//! the legacy v1 summaries and [`OuraClientV2`] for the `usercollection`
//! resources. Both implement the [`OuraApi`] capability (fetch a named
//! endpoint filtered by a [`QueryWindow`]), selected at construction time.
//!
//! The clients hold no mutable session state other than the current
//! credentials. When an access token has expired and a refresh token is
//! available, any data call transparently refreshes, hands the new token to
//! the configured [`TokenSink`](crate::auth::TokenSink), and retries the
//! original request once. All other failures propagate unchanged.

mod v1;
mod v2;

pub use v1::OuraClient;
pub use v2::OuraClientV2;

use crate::auth::{AuthClient, AuthConfig, OAuth2Credentials, TokenSink};
use crate::errors::{OuraError, Result};
use crate::utils::http_client::shared_client;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Optional filters applied to list-style endpoints.
///
/// All fields are optional; absence means "server default" (typically the
/// most recent day or full history). `next_token` is the opaque pagination
/// cursor of the v2 API, passed through unchanged from the prior response.
#[derive(Debug, Clone, Default)]
pub struct QueryWindow {
    /// First day of the range, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day of the range, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Opaque pagination cursor (v2 endpoints only).
    pub next_token: Option<String>,
}

impl QueryWindow {
    /// Window covering an inclusive date range.
    #[must_use]
    pub const fn dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start_date: start,
            end_date: end,
            next_token: None,
        }
    }

    /// Window carrying only a pagination cursor from a prior response.
    #[must_use]
    pub fn page(next_token: impl Into<String>) -> Self {
        Self {
            start_date: None,
            end_date: None,
            next_token: Some(next_token.into()),
        }
    }

    /// Attach a pagination cursor to an existing window.
    #[must_use]
    pub fn with_next_token(mut self, next_token: impl Into<String>) -> Self {
        self.next_token = Some(next_token.into());
        self
    }
}

/// Shared fetch capability implemented by both API generations.
///
/// `endpoint` is the resource path segment under the client's API base;
/// the window is translated into each generation's query parameter names.
#[async_trait]
pub trait OuraApi: Send + Sync {
    /// Issue an authenticated GET for `endpoint` and return the parsed body.
    async fn fetch(&self, endpoint: &str, window: &QueryWindow) -> Result<Value>;
}

/// Active authentication mode. Exactly one mode is live per client; the
/// enum makes the personal-token / OAuth exclusivity structural.
enum AuthMode {
    /// Long-lived, non-refreshable bearer credential.
    Personal { access_token: String },
    /// Refreshable OAuth2 token pair.
    OAuth { credentials: OAuth2Credentials },
}

/// Credential state plus the request pipeline shared by both clients.
pub(crate) struct Session {
    mode: RwLock<AuthMode>,
    sink: Option<Box<dyn TokenSink>>,
    auth_config: AuthConfig,
    http: Client,
}

impl Session {
    pub(crate) fn personal(access_token: impl Into<String>) -> Self {
        Self {
            mode: RwLock::new(AuthMode::Personal {
                access_token: access_token.into(),
            }),
            sink: None,
            auth_config: AuthConfig::default(),
            http: shared_client().clone(),
        }
    }

    pub(crate) fn oauth(
        credentials: OAuth2Credentials,
        sink: Option<Box<dyn TokenSink>>,
    ) -> Self {
        Self {
            mode: RwLock::new(AuthMode::OAuth { credentials }),
            sink,
            auth_config: AuthConfig::default(),
            http: shared_client().clone(),
        }
    }

    pub(crate) fn set_auth_config(&mut self, config: AuthConfig) {
        self.auth_config = config;
    }

    /// Issue an authenticated GET, refreshing the access token at most once.
    ///
    /// An expired token with a refresh token available is renewed before the
    /// request goes out; a 401 on a token of unknown expiry triggers the same
    /// renewal followed by a single retry. Either way the sink sees the new
    /// token exactly once per call.
    pub(crate) async fn get_json(&self, url: url::Url) -> Result<Value> {
        let refreshed = self.ensure_fresh().await?;
        let token = self.bearer().await?;

        debug!("GET {url}");
        let response = self.send(url.clone(), &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED && !refreshed && self.can_refresh().await
        {
            info!("Access token rejected by the API, refreshing and retrying once");
            self.refresh_and_persist().await?;
            let token = self.bearer().await?;
            let retried = self.send(url, &token).await?;
            return Self::parse(retried).await;
        }

        Self::parse(response).await
    }

    /// Refresh up front when the token is known to be expired. Returns
    /// whether a refresh happened, so the 401 path does not refresh twice.
    async fn ensure_fresh(&self) -> Result<bool> {
        let expired = {
            let guard = self.mode.read().await;
            match &*guard {
                AuthMode::Personal { .. } => false,
                AuthMode::OAuth { credentials } => credentials.is_expired(),
            }
        };

        if expired {
            self.refresh_and_persist().await?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn can_refresh(&self) -> bool {
        match &*self.mode.read().await {
            AuthMode::Personal { .. } => false,
            AuthMode::OAuth { credentials } => credentials.refresh_token.is_some(),
        }
    }

    async fn bearer(&self) -> Result<String> {
        match &*self.mode.read().await {
            AuthMode::Personal { access_token } => Ok(access_token.clone()),
            AuthMode::OAuth { credentials } => credentials
                .access_token
                .clone()
                .ok_or_else(|| OuraError::auth("no access token available")),
        }
    }

    /// Renew the token pair, store it, and hand it to the sink.
    async fn refresh_and_persist(&self) -> Result<()> {
        let (client_id, client_secret, refresh_token) = {
            let guard = self.mode.read().await;
            match &*guard {
                AuthMode::Personal { .. } => {
                    return Err(OuraError::auth(
                        "personal access tokens cannot be refreshed",
                    ));
                }
                AuthMode::OAuth { credentials } => {
                    let refresh_token = credentials.refresh_token.clone().ok_or_else(|| {
                        OuraError::auth("access token expired and no refresh token is available")
                    })?;
                    (
                        credentials.client_id.clone(),
                        credentials.client_secret.clone(),
                        refresh_token,
                    )
                }
            }
        };

        let auth = AuthClient::with_config(client_id, client_secret, self.auth_config.clone());
        let token = auth.refresh(&refresh_token).await?;

        {
            let mut guard = self.mode.write().await;
            if let AuthMode::OAuth { credentials } = &mut *guard {
                credentials.apply(&token);
            }
        }

        if let Some(sink) = &self.sink {
            sink.persist(&token);
        }
        Ok(())
    }

    async fn send(&self, url: url::Url, access_token: &str) -> Result<Response> {
        self.http
            .get(url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|source| OuraError::Transport { source })
    }

    async fn parse(response: Response) -> Result<Value> {
        let status = response.status();
        debug!("Received HTTP response with status: {status}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Oura API request failed - status: {status}, body_length: {}", body.len());
            if status == StatusCode::UNAUTHORIZED {
                return Err(OuraError::auth(format!(
                    "API rejected the credentials ({status}): {body}"
                )));
            }
            return Err(OuraError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| OuraError::shape(format!("failed to parse API response: {e}")))
    }
}

/// Join an API base and an endpoint segment into a request URL.
pub(crate) fn endpoint_url(api_base: &str, endpoint: &str) -> Result<url::Url> {
    let joined = format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    url::Url::parse(&joined)
        .map_err(|e| OuraError::config(format!("invalid endpoint URL `{joined}`: {e}")))
}
