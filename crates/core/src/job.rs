// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job documents and their identifiers.

use crate::clock::Clock;
use crate::policy::RunMode;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

/// Unique identifier for a queued job.
///
/// Format: `<epoch-seconds>-<8 hex chars>`. The leading epoch makes
/// lexicographic order match submission order within one second; the random
/// suffix disambiguates within a second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn generate(clock: &impl Clock) -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", clock.epoch_secs(), &hex[..8]))
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What kind of work a job describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    /// Inspect one named repository.
    Repository,
    /// Fan out over many repositories.
    Sweep,
}

crate::simple_display! {
    JobType {
        Repository => "repository",
        Sweep => "sweep",
    }
}

/// How the worker selects repositories and analysis depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    All,
    Changed,
    Deep,
    Light,
}

crate::simple_display! {
    JobMode {
        All => "all",
        Changed => "changed",
        Deep => "deep",
        Light => "light",
    }
}

impl JobMode {
    /// Deep/light modes force the analysis depth; all/changed defer to policy.
    pub fn run_mode_override(self) -> Option<RunMode> {
        match self {
            JobMode::Deep => Some(RunMode::Deep),
            JobMode::Light => Some(RunMode::Light),
            JobMode::All | JobMode::Changed => None,
        }
    }

    /// Whether repository enumeration should consult the remote org listing.
    pub fn enumerates_remote(self) -> bool {
        matches!(self, JobMode::All)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid repo name format")]
pub struct RepoNameError;

fn repo_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        let re = Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("static pattern");
        re
    })
}

/// A validated `org/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName(String);

impl RepoName {
    pub fn parse(s: &str) -> Result<Self, RepoNameError> {
        if repo_name_re().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(RepoNameError)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn org(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or("")
    }
}

impl TryFrom<String> for RepoName {
    type Error = RepoNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        RepoName::parse(&s)
    }
}

impl From<RepoName> for String {
    fn from(r: RepoName) -> String {
        r.0
    }
}

impl std::fmt::Display for RepoName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A queued unit of work.
///
/// The file content under `queue/<job_id>.json` is exactly this document.
/// Jobs are never mutated in place; progress is recorded as events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    #[serde(rename = "type")]
    pub kind: JobType,
    pub mode: JobMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<RepoName>,
    /// Absent or null means "use the policy default". Non-boolean values in
    /// hand-edited queue files are tolerated and treated as unset.
    #[serde(default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub auto_pr: Option<bool>,
    pub ts: DateTime<Utc>,
}

impl Job {
    pub fn new(clock: &impl Clock, kind: JobType, mode: JobMode, repo: Option<RepoName>) -> Self {
        Self {
            job_id: JobId::generate(clock),
            kind,
            mode,
            repo,
            auto_pr: None,
            ts: clock.now_utc(),
        }
    }

    pub fn with_auto_pr(mut self, auto_pr: Option<bool>) -> Self {
        self.auto_pr = auto_pr;
        self
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Bool(bool),
        Other(serde::de::IgnoredAny),
    }

    match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Bool(b)) => Ok(Some(b)),
        Some(Lenient::Other(_)) => {
            tracing::warn!("non-boolean auto_pr in job document, deferring to policy");
            Ok(None)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
