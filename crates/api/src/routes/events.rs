// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-log read endpoints and the worker-log view.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sichter_storage::TailRecord;
use std::path::PathBuf;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_TAIL: usize = 200;

#[derive(Debug, Deserialize)]
pub struct TailParams {
    pub n: Option<usize>,
    /// Epoch seconds; files whose mtime predates this are skipped.
    pub since: Option<i64>,
}

async fn collect(state: &AppState, params: &TailParams) -> Result<Vec<TailRecord>, ApiError> {
    let log = state.events.clone();
    let n = params.n.unwrap_or(DEFAULT_TAIL);
    let since = params.since;
    tokio::task::spawn_blocking(move || log.tail(n, since))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(|err| ApiError::Internal(err.to_string()))
}

/// `GET /events/tail`: newest-first raw JSONL text.
pub async fn tail(
    State(state): State<AppState>,
    Query(params): Query<TailParams>,
) -> Result<String, ApiError> {
    let records = collect(&state, &params).await?;
    let mut body = records.into_iter().map(|r| r.line).collect::<Vec<_>>().join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    Ok(body)
}

/// `GET /events/recent`: the same records, parsed for dashboards.
pub async fn recent(
    State(state): State<AppState>,
    Query(params): Query<TailParams>,
) -> Result<impl IntoResponse, ApiError> {
    let records = collect(&state, &params).await?;
    Ok(Json(json!({ "events": records })))
}

/// `GET /logs/latest`: the newest free-form worker log, whole.
pub async fn logs_latest(State(state): State<AppState>) -> Result<String, ApiError> {
    let logs_dir = state.tree.logs_dir();
    tokio::task::spawn_blocking(move || read_newest_log(&logs_dir))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(|err| ApiError::Internal(err.to_string()))
}

fn read_newest_log(dir: &std::path::Path) -> std::io::Result<String> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
        Err(err) => return Err(err),
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "log") {
            continue;
        }
        let mtime = entry.metadata()?.modified()?;
        if newest.as_ref().is_none_or(|(t, _)| mtime > *t) {
            newest = Some((mtime, path));
        }
    }
    match newest {
        Some((_, path)) => std::fs::read_to_string(path),
        None => Ok(String::new()),
    }
}
