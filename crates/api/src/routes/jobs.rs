// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job submission endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sichter_core::{Job, JobMode, JobType, RepoName};

use crate::error::ApiError;
use crate::state::AppState;

fn default_mode() -> JobMode {
    JobMode::Changed
}

#[derive(Debug, Deserialize)]
pub struct EnqueueBody {
    pub repo: String,
    #[serde(default = "default_mode")]
    pub mode: JobMode,
    #[serde(default)]
    pub auto_pr: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SweepBody {
    #[serde(default = "default_mode")]
    pub mode: JobMode,
}

/// `POST /enqueue`: queue an inspection of one repository.
pub async fn enqueue(
    State(state): State<AppState>,
    Json(body): Json<EnqueueBody>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RepoName::parse(&body.repo).map_err(|_| ApiError::invalid_repo())?;
    let job = Job::new(&state.clock, JobType::Repository, body.mode, Some(repo))
        .with_auto_pr(body.auto_pr);
    submit(state, job).await
}

/// `POST /sweep`: queue a fan-out over all eligible repositories.
pub async fn sweep(
    State(state): State<AppState>,
    Json(body): Json<SweepBody>,
) -> Result<impl IntoResponse, ApiError> {
    let job = Job::new(&state.clock, JobType::Sweep, body.mode, None);
    submit(state, job).await
}

async fn submit(state: AppState, job: Job) -> Result<impl IntoResponse, ApiError> {
    let queue = state.queue.clone();
    let events = state.events.clone();
    let clock = state.clock.clone();
    let stored = job.clone();

    let result = tokio::task::spawn_blocking(move || queue.enqueue(&stored, &events, &clock))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    if let Err(err) = result {
        tracing::error!(job_id = %job.job_id, %err, "failed to enqueue job");
        let retryable = !matches!(
            &err,
            sichter_storage::QueueError::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied
        );
        return Err(ApiError::EnqueueFailed { retryable });
    }

    Ok((StatusCode::ACCEPTED, Json(json!({ "enqueued": job.job_id, "queued": job }))))
}
