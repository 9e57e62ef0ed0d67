// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL event log with daily rotation.
//!
//! The API and the worker are separate processes appending to the same day
//! file; each append is one buffered line written under an advisory lock so
//! concurrent writers interleave at line boundaries only. Rotation is
//! implicit: a new UTC day writes to a new file name, nothing is truncated.

use crate::tail::tail_lines;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use sichter_core::Event;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One record from a tail query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailRecord {
    /// The raw JSONL line as stored.
    pub line: String,
    pub payload: serde_json::Value,
    pub ts: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventLog {
    dir: PathBuf,
}

impl EventLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one event as a single `\n`-terminated line to the day file
    /// chosen by the event's UTC timestamp.
    pub fn append(&self, event: &Event) -> Result<(), EventLogError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let path = self.dir.join(format!("{}.jsonl", event.day_bucket()));
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // Serialize cross-process appends; O_APPEND alone is not guaranteed
        // whole-line atomic on every filesystem.
        file.lock_exclusive()?;
        let result = file.write_all(&line);
        let _ = FileExt::unlock(&file);
        result?;
        Ok(())
    }

    /// Newest `n` records across all day files, newest-first.
    ///
    /// `since` filters out files whose mtime predates the given epoch
    /// seconds. Lines that are not JSON objects with a parseable `ts` are
    /// skipped silently. Files are read newest-name-first and only tailed,
    /// never loaded whole.
    pub fn tail(&self, n: usize, since: Option<i64>) -> Result<Vec<TailRecord>, EventLogError> {
        let mut records = Vec::new();
        if n == 0 {
            return Ok(records);
        }

        for path in self.day_files_desc()? {
            if records.len() >= n {
                break;
            }
            if let Some(since) = since {
                if !mtime_at_or_after(&path, since) {
                    continue;
                }
            }

            let needed = n - records.len();
            let lines = match tail_lines(&path, needed) {
                Ok(lines) => lines,
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "skipping unreadable event file");
                    continue;
                }
            };
            // tail_lines is oldest-first; newest-first for the result.
            for line in lines.into_iter().rev() {
                if let Some(record) = parse_record(line) {
                    records.push(record);
                    if records.len() >= n {
                        break;
                    }
                }
            }
        }
        Ok(records)
    }

    /// The newest day file by name, if any. Day stems (`YYYYMMDD`) sort
    /// lexicographically in date order.
    pub fn newest_file(&self) -> Option<PathBuf> {
        self.day_files_desc().ok()?.into_iter().next()
    }

    /// All `*.jsonl` day files, newest name first.
    pub fn day_files_desc(&self) -> Result<Vec<PathBuf>, EventLogError> {
        let mut files = Vec::new();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_jsonl = path.extension().is_some_and(|ext| ext == "jsonl");
            if is_jsonl && entry.file_type()?.is_file() {
                files.push(path);
            }
        }
        files.sort();
        files.reverse();
        Ok(files)
    }
}

fn parse_record(line: String) -> Option<TailRecord> {
    if line.trim().is_empty() {
        return None;
    }
    let payload: serde_json::Value = serde_json::from_str(&line).ok()?;
    let ts = payload.get("ts")?.as_str()?.parse::<DateTime<Utc>>().ok()?;
    let kind = payload.get("type").and_then(|v| v.as_str()).map(str::to_string);
    Some(TailRecord { line, payload, ts, kind })
}

fn mtime_at_or_after(path: &Path, since_epoch_secs: i64) -> bool {
    let Ok(meta) = path.metadata() else {
        return false;
    };
    let Ok(mtime) = meta.modified() else {
        return false;
    };
    let threshold = UNIX_EPOCH + Duration::from_secs(since_epoch_secs.max(0) as u64);
    mtime >= threshold
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
