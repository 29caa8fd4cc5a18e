// ABOUTME: Shared utility modules
// ABOUTME: HTTP client pooling helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared utilities.

pub mod http_client;
