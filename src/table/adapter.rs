// ABOUTME: Table-producing wrappers around the v1 and v2 API clients
// ABOUTME: One <endpoint>_table method per underlying endpoint, indexed by the record's date key
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Table;
use crate::client::{OuraClient, OuraClientV2, QueryWindow};
use crate::errors::{OuraError, Result};
use serde_json::Value;

/// Pull the record array out of a summary envelope.
fn records(mut response: Value, envelope: &str) -> Result<Vec<Value>> {
    match response.get_mut(envelope).map(Value::take) {
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(OuraError::shape(format!(
            "`{envelope}` field is not an array"
        ))),
        None => Err(OuraError::shape(format!(
            "response is missing the `{envelope}` field"
        ))),
    }
}

/// Tabular wrapper around the legacy v1 client.
///
/// Each method calls the matching [`OuraClient`] endpoint and converts the
/// response into a [`Table`] indexed by `summary_date` (bedtime: `date`).
/// Errors are those of the wrapped client plus
/// [`OuraError::Shape`](crate::OuraError::Shape) for a malformed envelope.
pub struct TableClient {
    inner: OuraClient,
}

impl TableClient {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(inner: OuraClient) -> Self {
        Self { inner }
    }

    /// Convenience constructor for personal-access-token mode.
    #[must_use]
    pub fn from_personal_token(personal_access_token: impl Into<String>) -> Self {
        Self::new(OuraClient::from_personal_token(personal_access_token))
    }

    /// The wrapped client, for raw JSON access.
    #[must_use]
    pub const fn client(&self) -> &OuraClient {
        &self.inner
    }

    /// User profile as a single unindexed row.
    pub async fn user_info_table(&self, flatten: bool) -> Result<Table> {
        let info = self.inner.user_info().await?;
        Ok(Table::from_records(vec![info], None, flatten))
    }

    /// Sleep summaries indexed by `summary_date`.
    pub async fn sleep_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.sleep_summary(window).await?;
        Ok(Table::from_records(
            records(response, "sleep")?,
            Some("summary_date"),
            flatten,
        ))
    }

    /// Activity summaries indexed by `summary_date`.
    pub async fn activity_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.activity_summary(window).await?;
        Ok(Table::from_records(
            records(response, "activity")?,
            Some("summary_date"),
            flatten,
        ))
    }

    /// Readiness summaries indexed by `summary_date`.
    pub async fn readiness_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.readiness_summary(window).await?;
        Ok(Table::from_records(
            records(response, "readiness")?,
            Some("summary_date"),
            flatten,
        ))
    }

    /// Ideal bedtime recommendations indexed by `date`.
    pub async fn bedtime_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.bedtime_summary(window).await?;
        Ok(Table::from_records(
            records(response, "ideal_bedtimes")?,
            Some("date"),
            flatten,
        ))
    }

    /// Sleep, readiness, and activity summaries joined on date, with
    /// `SLEEP:` / `READY:` / `ACTIVITY:` column prefixes.
    pub async fn combined_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let sleep = self.sleep_table(window, flatten).await?.prefix_columns("SLEEP");
        let readiness = self
            .readiness_table(window, flatten)
            .await?
            .prefix_columns("READY");
        let activity = self
            .activity_table(window, flatten)
            .await?
            .prefix_columns("ACTIVITY");

        Ok(sleep.join(&readiness).join(&activity))
    }
}

/// Tabular wrapper around the v2 client.
///
/// Date keys follow the v2 record shapes: `day` for the daily summaries,
/// sessions, and workouts; `timestamp` (truncated to its date) for the
/// time-series style resources.
pub struct TableClientV2 {
    inner: OuraClientV2,
}

impl TableClientV2 {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(inner: OuraClientV2) -> Self {
        Self { inner }
    }

    /// Convenience constructor for personal-access-token mode.
    #[must_use]
    pub fn from_personal_token(personal_access_token: impl Into<String>) -> Self {
        Self::new(OuraClientV2::from_personal_token(personal_access_token))
    }

    /// The wrapped client, for raw JSON access.
    #[must_use]
    pub const fn client(&self) -> &OuraClientV2 {
        &self.inner
    }

    /// Personal info as a single unindexed row.
    pub async fn personal_info_table(&self, flatten: bool) -> Result<Table> {
        let info = self.inner.personal_info().await?;
        Ok(Table::from_records(vec![info], None, flatten))
    }

    /// Daily activity summaries indexed by `timestamp` date.
    pub async fn activity_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.daily_activity(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("timestamp"),
            flatten,
        ))
    }

    /// Daily readiness summaries indexed by `day`.
    pub async fn readiness_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.daily_readiness(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("day"),
            flatten,
        ))
    }

    /// Daily sleep scores indexed by `day`.
    pub async fn daily_sleep_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.daily_sleep(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("day"),
            flatten,
        ))
    }

    /// Sleep periods indexed by `day`.
    pub async fn sleep_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.sleep(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("day"),
            flatten,
        ))
    }

    /// Heart rate samples indexed by `timestamp` date.
    pub async fn heart_rate_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.heart_rate(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("timestamp"),
            flatten,
        ))
    }

    /// Sessions indexed by `day`.
    pub async fn sessions_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.sessions(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("day"),
            flatten,
        ))
    }

    /// Tags indexed by `timestamp` date.
    pub async fn tags_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.tags(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("timestamp"),
            flatten,
        ))
    }

    /// Workouts indexed by `day`.
    pub async fn workouts_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.workouts(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("day"),
            flatten,
        ))
    }

    /// Cardiovascular age estimates indexed by `timestamp` date.
    pub async fn cardiovascular_age_table(
        &self,
        window: &QueryWindow,
        flatten: bool,
    ) -> Result<Table> {
        let response = self.inner.cardiovascular_age(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("timestamp"),
            flatten,
        ))
    }

    /// VO2 max estimates indexed by `timestamp` date.
    pub async fn vo2_max_table(&self, window: &QueryWindow, flatten: bool) -> Result<Table> {
        let response = self.inner.vo2_max(window).await?;
        Ok(Table::from_records(
            records(response, "data")?,
            Some("timestamp"),
            flatten,
        ))
    }
}
