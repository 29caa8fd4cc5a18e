// ABOUTME: v2 Oura API client covering the usercollection resources
// ABOUTME: Method names map directly to URL path segments; supports next_token pagination
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{endpoint_url, OuraApi, QueryWindow, Session};
use crate::auth::{AuthConfig, OAuth2Credentials, TokenSink};
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;

/// v2 API base URL.
const API_BASE: &str = "https://api.ouraring.com/v2/usercollection";

/// Client for the v2 Oura API.
///
/// List endpoints return a `data` array plus a `next_token` cursor when more
/// pages exist; pass the cursor back unchanged via
/// [`QueryWindow::with_next_token`] to fetch the next page.
pub struct OuraClientV2 {
    session: Session,
    api_base: String,
}

impl OuraClientV2 {
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

    /// Client from previously persisted credentials.
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
    pub async fn personal_info(&self) -> Result<Value> {
        self.fetch("personal_info", &QueryWindow::default()).await
    }

    /// Daily activity summaries.
    pub async fn daily_activity(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("daily_activity", window).await
    }

    /// Daily readiness summaries.
    pub async fn daily_readiness(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("daily_readiness", window).await
    }

    /// Daily sleep scores.
    pub async fn daily_sleep(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("daily_sleep", window).await
    }

    /// Individual sleep periods.
    pub async fn sleep(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("sleep", window).await
    }

    /// Heart rate time series.
    pub async fn heart_rate(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("heartrate", window).await
    }

    /// Moment and rest-mode sessions.
    pub async fn sessions(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("session", window).await
    }

    /// User-entered tags.
    pub async fn tags(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("tag", window).await
    }

    /// Workout records.
    pub async fn workouts(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("workout", window).await
    }

    /// Daily cardiovascular age estimates.
    pub async fn cardiovascular_age(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("daily_cardiovascular_age", window).await
    }

    /// VO2 max estimates.
    pub async fn vo2_max(&self, window: &QueryWindow) -> Result<Value> {
        self.fetch("vO2_max", window).await
    }
}

#[async_trait]
impl OuraApi for OuraClientV2 {
    async fn fetch(&self, endpoint: &str, window: &QueryWindow) -> Result<Value> {
        let mut url = endpoint_url(&self.api_base, endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(start) = window.start_date {
                pairs.append_pair("start_date", &start.to_string());
            }
            if let Some(end) = window.end_date {
                pairs.append_pair("end_date", &end.to_string());
            }
            if let Some(next_token) = window.next_token.as_deref() {
                pairs.append_pair("next_token", next_token);
            }
        }
        self.session.get_json(url).await
    }
}
