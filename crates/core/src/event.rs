// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event records.
//!
//! One event is one JSON line in a daily `events/YYYYMMDD.jsonl` file.
//! Records are never rewritten; readers must tolerate partial last lines.

use crate::clock::Clock;
use crate::job::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable record: timestamp plus a type-tagged payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(clock: &impl Clock, kind: EventKind) -> Self {
        Self { ts: clock.now_utc(), kind }
    }

    /// Daily file stem (`YYYYMMDD`) for this event's UTC timestamp.
    pub fn day_bucket(&self) -> String {
        self.ts.format("%Y%m%d").to_string()
    }
}

/// Event taxonomy.
///
/// Serializes as `{"type": "<snake_case tag>", ...fields}`. `heartbeat` is
/// synthesized by the live stream only and never appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A job entered the queue.
    Queue { job_id: JobId, payload: serde_json::Value },

    /// The policy document changed.
    Policy { action: String, values: serde_json::Value },

    Start { message: String },
    Stop { message: String },
    Error { message: String },

    /// Analyzers produced diagnostics for a repository.
    Findings { repo: String, count: usize, deduped: usize },

    CloneFailed { repo: String, error: String },

    /// Work was committed locally; `auto_pr` records whether publication follows.
    Commit { repo: String, branch: String, auto_pr: bool },

    Pr { repo: String, branch: String, url: String },
    PushFailed { repo: String, branch: String, error: String },
    PrFailed { repo: String, branch: String, error: String },

    /// A repository pass produced no changes.
    Noop { repo: String, branch: String },

    Heartbeat,
}

impl EventKind {
    /// Tag string as it appears on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::Queue { .. } => "queue",
            EventKind::Policy { .. } => "policy",
            EventKind::Start { .. } => "start",
            EventKind::Stop { .. } => "stop",
            EventKind::Error { .. } => "error",
            EventKind::Findings { .. } => "findings",
            EventKind::CloneFailed { .. } => "clone_failed",
            EventKind::Commit { .. } => "commit",
            EventKind::Pr { .. } => "pr",
            EventKind::PushFailed { .. } => "push_failed",
            EventKind::PrFailed { .. } => "pr_failed",
            EventKind::Noop { .. } => "noop",
            EventKind::Heartbeat => "heartbeat",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
