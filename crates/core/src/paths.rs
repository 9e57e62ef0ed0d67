// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State and config directory resolution.
//!
//! ```text
//! STATE/
//!   queue/      one job per file
//!   events/     daily JSONL event log
//!   logs/       free-form worker logs
//!   worker.pid  worker mutual exclusion
//! CONFIG/
//!   policy.yml
//! ```

use std::io;
use std::path::{Path, PathBuf};

pub const STATE_HOME_ENV: &str = "SICHTER_STATE_HOME";

/// Resolved filesystem layout for one sichter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTree {
    state_dir: PathBuf,
    config_dir: PathBuf,
}

impl StateTree {
    /// Resolve from the environment: `SICHTER_STATE_HOME` wins, then the
    /// XDG conventions.
    pub fn resolve() -> Self {
        let state_dir = std::env::var_os(STATE_HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("XDG_STATE_HOME").map(|p| PathBuf::from(p).join("sichter")))
            .or_else(|| dirs::state_dir().map(|p| p.join("sichter")))
            .unwrap_or_else(|| fallback_home().join(".local/state/sichter"));

        let config_dir = std::env::var_os("XDG_CONFIG_HOME")
            .map(|p| PathBuf::from(p).join("sichter"))
            .or_else(|| dirs::config_dir().map(|p| p.join("sichter")))
            .unwrap_or_else(|| fallback_home().join(".config/sichter"));

        Self { state_dir, config_dir }
    }

    /// Explicit roots, for tests and overrides.
    pub fn at(state_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self { state_dir: state_dir.into(), config_dir: config_dir.into() }
    }

    /// Create every directory the tree needs. Idempotent.
    pub fn ensure(&self) -> io::Result<()> {
        for dir in [&self.state_dir, &self.config_dir, &self.queue_dir(), &self.events_dir(), &self.logs_dir()]
        {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn queue_dir(&self) -> PathBuf {
        self.state_dir.join("queue")
    }

    pub fn events_dir(&self) -> PathBuf {
        self.state_dir.join("events")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn pid_path(&self) -> PathBuf {
        self.state_dir.join("worker.pid")
    }

    pub fn policy_path(&self) -> PathBuf {
        self.config_dir.join("policy.yml")
    }
}

fn fallback_home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
