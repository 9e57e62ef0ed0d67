// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy read and atomic write.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sichter_core::{Event, EventKind};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WriteBody {
    pub values: serde_json::Value,
}

/// `GET /policy`: the raw document plus its path.
pub async fn read(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let store = state.policy.clone();
    let raw = tokio::task::spawn_blocking(move || store.read_raw())
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let values = serde_json::to_value(&raw).map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(json!({ "path": state.policy.path().display().to_string(), "values": values })))
}

/// `PUT /policy`: atomically replace the document and record the change.
pub async fn write(
    State(state): State<AppState>,
    Json(body): Json<WriteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.policy.clone();
    let values = body.values.clone();
    tokio::task::spawn_blocking(move || store.write(&values))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let event = Event::new(
        &state.clock,
        EventKind::Policy { action: "write".to_string(), values: body.values.clone() },
    );
    if let Err(err) = state.events.append(&event) {
        tracing::warn!(%err, "policy written but event append failed");
    }

    Ok(Json(json!({ "path": state.policy.path().display().to_string(), "values": body.values })))
}
