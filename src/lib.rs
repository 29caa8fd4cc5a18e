// ABOUTME: Main library entry point for the oura-client crate
// ABOUTME: Re-exports the auth, client, table, and export surfaces
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # oura-client
//!
//! A client for the [Oura Ring web API](https://cloud.ouraring.com/docs).
//!
//! The crate wraps the documented REST endpoints of both API generations,
//! handles the OAuth2 authorization-code and refresh-token flows, and can
//! optionally reshape JSON summaries into date-indexed tables.
//!
//! ## Components
//!
//! - **`auth`**: authorize-URL construction, code-for-token exchange, and
//!   refresh-token renewal, plus a personal-access-token passthrough mode.
//! - **`client`**: [`OuraClient`] (legacy v1 summaries) and [`OuraClientV2`]
//!   (v2 `usercollection` resources), both implementing the [`OuraApi`]
//!   fetch capability.
//! - **`table`**: [`TableClient`] / [`TableClientV2`] wrappers that convert
//!   endpoint responses into [`Table`] values indexed by date, with optional
//!   flattening of nested objects into dotted column paths.
//! - **`export`**: CSV and plain-text writers for [`Table`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use oura_client::{OuraClientV2, QueryWindow, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = OuraClientV2::from_personal_token("my-pat");
//!     let sleep = client.daily_sleep(&QueryWindow::default()).await?;
//!     println!("{sleep}");
//!     Ok(())
//! }
//! ```
//!
//! Token persistence is the caller's responsibility: supply a [`TokenSink`]
//! at construction and the client invokes it after every successful refresh.

pub mod auth;
pub mod client;
pub mod errors;
pub mod export;
pub mod table;
pub mod utils;

pub use auth::{AuthClient, AuthConfig, OAuth2Credentials, Token, TokenSink};
pub use client::{OuraApi, OuraClient, OuraClientV2, QueryWindow};
pub use errors::{OuraError, Result};
pub use table::{Row, Table, TableClient, TableClientV2};
