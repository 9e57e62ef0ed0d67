// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness and readiness probes. Both are unauthenticated.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready iff the state tree's directories all exist. A missing directory
/// is a deployment problem the operator must see, not something handlers
/// should paper over at request time.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let queue = state.tree.queue_dir().is_dir();
    let events = state.tree.events_dir().is_dir();
    let logs = state.tree.logs_dir().is_dir();
    let ready = queue && events && logs;

    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "status": if ready { "ok" } else { "degraded" },
        "queue": queue,
        "events": events,
        "logs": logs,
    });
    (status, Json(body))
}
