// ABOUTME: Structured error types for Oura API operations
// ABOUTME: Covers auth failures, API rejections, transport errors, and malformed data
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unified error handling for the crate.
//!
//! Every fallible operation returns [`Result<T>`]. The variants map onto the
//! failure surfaces of a thin API client: credential problems, non-2xx data
//! API responses, network failures, and malformed response data encountered
//! during tabular conversion.

use thiserror::Error;

/// Errors produced by the Oura client.
#[derive(Debug, Error)]
pub enum OuraError {
    /// Bad, expired, or unrefreshable credentials, or a rejected
    /// authorization code. A 401 from the data API also surfaces here once
    /// the single refresh-and-retry has been exhausted (or is unavailable).
    #[error("authentication failed: {reason}")]
    Auth {
        /// Human-readable failure description.
        reason: String,
    },

    /// Non-2xx response from the data API, carrying enough context for the
    /// caller to decide whether to re-authenticate or abort.
    #[error("Oura API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Network or connection failure before an HTTP response was received.
    #[error("network error: {source}")]
    Transport {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// Structurally malformed response data (unparsable JSON, or a summary
    /// envelope missing its expected array field).
    #[error("malformed response data: {details}")]
    Shape {
        /// What was wrong with the data.
        details: String,
    },

    /// Invalid client construction or endpoint configuration.
    #[error("invalid configuration: {details}")]
    Config {
        /// What was wrong with the configuration.
        details: String,
    },

    /// CSV export failure.
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl OuraError {
    /// Build an [`OuraError::Auth`] from anything displayable.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    /// Build an [`OuraError::Shape`] from anything displayable.
    pub fn shape(details: impl Into<String>) -> Self {
        Self::Shape {
            details: details.into(),
        }
    }

    /// Build an [`OuraError::Config`] from anything displayable.
    pub fn config(details: impl Into<String>) -> Self {
        Self::Config {
            details: details.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OuraError>;
