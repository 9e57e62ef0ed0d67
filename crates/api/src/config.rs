// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server configuration, bound to flags and environment variables.

use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8321";
pub const DEFAULT_RATE_LIMIT_MAX: usize = 120;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Cross-origin policy parsed from configuration.
///
/// There is no permissive default: an operator must either name origins or
/// spell out the literal `*`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsOrigins {
    /// No configuration: cross-origin requests are refused.
    #[default]
    None,
    /// Explicitly configured wildcard. Credentials are not allowed here.
    Any,
    /// Explicit origin list; credentials allowed.
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list. A single `*` entry anywhere
    /// makes the whole policy wildcard.
    pub fn parse(raw: &str) -> Self {
        let entries: Vec<String> =
            raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
        if entries.is_empty() {
            CorsOrigins::None
        } else if entries.iter().any(|e| e == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(entries)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// Shared secret required in `X-API-Key`. Unset means the gate fails
    /// closed and rejects all gated traffic.
    pub api_key: Option<String>,
    pub rate_limit_max: usize,
    pub cors: CorsOrigins,
}

impl ApiConfig {
    pub fn new(api_key: Option<String>, rate_limit_max: usize, cors: CorsOrigins) -> Self {
        Self { api_key, rate_limit_max, cors }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
