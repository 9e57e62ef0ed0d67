// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed HTTP error responses.
//!
//! Everything surfaces as `{"detail": ...}`: a bare message string for
//! client errors, a structured object for enqueue failures so callers can
//! decide whether to retry.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::gate::GateError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", .0.message())]
    Auth(#[from] GateError),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("Internal server error")]
    EnqueueFailed { retryable: bool },

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_repo() -> Self {
        ApiError::BadRequest("Invalid repo name format".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::EnqueueFailed { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::EnqueueFailed { retryable } => json!({
                "error": "Internal server error",
                "code": "ENQUEUE_FAILED",
                "retryable": retryable,
            }),
            ApiError::Auth(err) => {
                // The kind stays in the logs; the body carries the message only.
                tracing::warn!(kind = err.kind_str(), "request rejected by API gate");
                json!(err.message())
            }
            ApiError::Internal(reason) => {
                tracing::error!(%reason, "internal error");
                json!("Internal server error")
            }
            other => json!(other.to_string()),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
