// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable job queue: one file per job, atomic create, delete on done.
//!
//! A job file exists exactly while the job is live. Enqueue goes through a
//! temporary sibling plus rename so the dequeuer can never observe a
//! partial document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sichter_core::{Clock, Event, EventKind, Job};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::event_log::EventLog;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("job document error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot of the queue for status views.
#[derive(Debug, Clone, Serialize)]
pub struct QueueState {
    pub size: usize,
    pub items: Vec<QueueEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(rename = "enqueuedAt")]
    pub enqueued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct JobQueue {
    dir: PathBuf,
}

impl JobQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Durably add a job and emit the matching `queue` event.
    ///
    /// The document lands under its final name only via rename; on any
    /// failure the temporary sibling is removed. A failed event append does
    /// not undo the enqueue (the job is already durable) and is only logged.
    pub fn enqueue(
        &self,
        job: &Job,
        log: &EventLog,
        clock: &impl Clock,
    ) -> Result<PathBuf, QueueError> {
        let payload = serde_json::to_value(job)?;
        let body = serde_json::to_vec_pretty(job)?;

        let target = self.dir.join(format!("{}.json", job.job_id));
        let tmp = self.dir.join(format!(".{}.json.tmp-{}", job.job_id, nanos_now()));

        let write_result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
            std::fs::rename(&tmp, &target)
        })();
        if let Err(err) = write_result {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }

        let event =
            Event::new(clock, EventKind::Queue { job_id: job.job_id.clone(), payload });
        if let Err(err) = log.append(&event) {
            tracing::warn!(job_id = %job.job_id, %err, "enqueued but failed to append queue event");
        }
        Ok(target)
    }

    /// Pending job files in lexicographic (≈ FIFO) order.
    ///
    /// Only plain files with a `.json` suffix count; symlinks, directories
    /// and in-flight temporaries are ignored.
    pub fn scan(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(err) => return Err(err),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }
            // symlink_metadata: a symlinked "job" is not a queue file.
            if !std::fs::symlink_metadata(&path)?.is_file() {
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }

    pub fn load(&self, path: &Path) -> Result<Job, QueueError> {
        let body = std::fs::read(path)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Remove a drained job file. Missing files are fine (already gone).
    pub fn remove(&self, path: &Path) -> std::io::Result<()> {
        match std::fs::remove_file(path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }

    /// Queue size plus the newest `limit` entries in chronological order.
    pub fn state(&self, limit: usize) -> std::io::Result<QueueState> {
        let files = self.scan()?;
        let size = files.len();
        let skip = size.saturating_sub(limit);

        let mut items = Vec::new();
        for path in files.into_iter().skip(skip) {
            let id = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let enqueued_at = path
                .metadata()
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            let payload: serde_json::Value = std::fs::read(&path)
                .ok()
                .and_then(|body| serde_json::from_slice(&body).ok())
                .unwrap_or_default();

            items.push(QueueEntry {
                id,
                kind: payload.get("type").and_then(|v| v.as_str()).map(str::to_string),
                mode: payload.get("mode").and_then(|v| v.as_str()).map(str::to_string),
                repo: payload.get("repo").and_then(|v| v.as_str()).map(str::to_string),
                enqueued_at,
            });
        }
        Ok(QueueState { size, items })
    }
}

fn nanos_now() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or_default()
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
