// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API-key gate.
//!
//! Fail-closed: a server without a configured secret rejects all gated
//! traffic. The comparison is constant-time so response latency does not
//! leak the position of the first mismatching byte.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Why the gate rejected a request. The kind is for logs; only the message
/// reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("API Key is not configured on server")]
    NotConfigured,
    #[error("API Key is missing")]
    Missing,
    #[error("Invalid API Key")]
    Invalid,
}

impl GateError {
    pub fn kind_str(self) -> &'static str {
        match self {
            GateError::NotConfigured => "not_configured",
            GateError::Missing => "missing",
            GateError::Invalid => "invalid",
        }
    }

    pub fn message(self) -> String {
        self.to_string()
    }
}

/// Core validation: constant-time byte comparison of the provided header
/// value against the configured secret.
pub fn check_api_key(provided: Option<&str>, expected: Option<&str>) -> Result<(), GateError> {
    let expected = match expected {
        Some(e) if !e.is_empty() => e,
        _ => return Err(GateError::NotConfigured),
    };
    let provided = match provided {
        Some(p) if !p.is_empty() => p,
        _ => return Err(GateError::Missing),
    };
    if provided.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(GateError::Invalid)
    }
}

/// Middleware enforcing the gate on every request it wraps.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    check_api_key(provided, state.config.api_key.as_deref())?;
    Ok(next.run(request).await)
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
