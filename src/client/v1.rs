// ABOUTME: Legacy v1 Oura API client covering the daily summary endpoints
// ABOUTME: Uses the legacy start/end query parameter convention
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{endpoint_url, OuraApi, QueryWindow, Session};
use crate::auth::{AuthConfig, OAuth2Credentials, TokenSink};
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;

/// v1 API base URL.
const API_BASE: &str = "https://api.ouraring.com/v1";

/// Client for the legacy v1 Oura API.
///
/// One method per documented summary resource. List endpoints accept a
/// [`QueryWindow`] translated into the legacy `start`/`end` parameter names;
/// the v1 API has no pagination cursor, so `next_token` is never emitted.
pub struct OuraClient {
    session: Session,
    api_base: String,
}

impl OuraClient {
    /// Client in personal-access-token mode. The token is static and never
    /// refreshed; if the API rejects it, the error surfaces unchanged.
    #[must_use]
    pub fn from_personal_token(personal_access_token: impl Into<String>) -> Self {
        Self {
            session: Session::personal(personal_access_token),
            api_base: API_BASE.to_owned(),
        }
    }

    /// Client in refreshable OAuth mode.
    ///
    /// `sink` receives every freshly issued token; pass `None` when the
    /// caller does not persist tokens.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        sink: Option<Box<dyn TokenSink>>,
    ) -> Self {
        let credentials = OAuth2Credentials {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            access_token: Some(access_token.into()),
            refresh_token,
            expires_at: None,
        };
        Self::from_credentials(credentials, sink)
    }

    /// Reduced, non-refreshing form for short-lived use.
    #[must_use]
    pub fn short_lived(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        let credentials = OAuth2Credentials {
            client_id: client_id.into(),
            client_secret: None,
            access_token: Some(access_token.into()),
            refresh_token: None,
            expires_at: None,
        };
        Self::from_credentials(credentials, None)
    }

    /// Client from previously persisted credentials, e.g. rebuilt from a
    /// [`Token`](crate::auth::Token) via [`OAuth2Credentials::from_token`].
    #[must_use]
    pub fn from_credentials(
        credentials: OAuth2Credentials,
        sink: Option<Box<dyn TokenSink>>,
    ) -> Self {
        Self {
            session: Session::oauth(credentials, sink),
            api_base: API_BASE.to_owned(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the OAuth endpoint configuration used for refreshes.
    #[must_use]
    pub fn with_auth_config(mut self, config: AuthConfig) -> Self {
        self.session.set_auth_config(config);
        self
    }

    /// Profile of the authenticated user. Takes no date parameters.
    pub async fn user_info(&self) -> Result<Value> {
        self.fetch("userinfo", &QueryWindow::default()).await
    }

    /// Sleep summaries, one record per night.
    pub async fn sleep_summary(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("sleep", window).await
    }

    /// Daily activity summaries.
    pub async fn activity_summary(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("activity", window).await
    }

    /// Daily readiness summaries.
    pub async fn readiness_summary(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("readiness", window).await
    }

    /// Ideal bedtime recommendations.
    pub async fn bedtime_summary(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("bedtime", window).await
    }
}

#[async_trait]
impl OuraApi for OuraClient {
    async fn fetch(&self, endpoint: &str, window: &QueryWindow) -> Result<Value> {
        let mut url = endpoint_url(&self.api_base, endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(start) = window.start_date {
                pairs.append_pair("start", &start.to_string());
            }
            if let Some(end) = window.end_date {
                pairs.append_pair("end", &end.to_string());
            }
            // The v1 API has no cursor; a next_token in the window is ignored.
        }
        self.session.get_json(url).await
    }
}
