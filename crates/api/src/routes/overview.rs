// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Combined status view for dashboards.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;
use crate::worker_status;

const QUEUE_PREVIEW: usize = 10;
const EVENT_PREVIEW: usize = 50;

/// `GET /overview`: worker status, queue state, and recent events.
pub async fn overview(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let worker = worker_status::status(&state.tree).await;

    let queue = state.queue.clone();
    let log = state.events.clone();
    let (queue_state, events) = tokio::task::spawn_blocking(move || {
        let queue_state = queue.state(QUEUE_PREVIEW);
        let events = log.tail(EVENT_PREVIEW, None);
        (queue_state, events)
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))?;

    let queue_state = queue_state.map_err(|err| ApiError::Internal(err.to_string()))?;
    let events = events.map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(Json(json!({ "worker": worker, "queue": queue_state, "events": events })))
}
