// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analyzer capability and the built-in analyzer set.
//!
//! An analyzer is an external tool examining source files and emitting
//! diagnostics in its native format; each implementation normalizes those
//! into [`Finding`]s. A missing tool is "unavailable", never an error, and
//! unparseable diagnostic output is logged and skipped so no tool can break
//! a job.

mod llm;
mod shellcheck;
mod yamllint;

pub use llm::LlmReviewer;
pub use shellcheck::Shellcheck;
pub use yamllint::Yamllint;

use async_trait::async_trait;
use glob::Pattern;
use sichter_core::{Finding, Policy, RunMode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The files an analyzer should look at.
#[derive(Debug, Clone)]
pub enum FileSelection {
    /// Whole repository; the analyzer walks for its own file types,
    /// honoring the exclude patterns.
    Whole { excludes: Vec<Pattern> },
    /// Pre-filtered set (changed mode); excludes are already applied.
    Paths(Vec<PathBuf>),
}

impl FileSelection {
    /// Candidate files with one of `extensions`, relative to `repo_root`.
    pub fn candidates(&self, repo_root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        match self {
            FileSelection::Paths(paths) => paths
                .iter()
                .filter(|p| has_extension(p, extensions))
                .cloned()
                .collect(),
            FileSelection::Whole { excludes } => {
                let mut files = Vec::new();
                for ext in extensions {
                    let pattern = format!("{}/**/*.{ext}", repo_root.display());
                    let Ok(matches) = glob::glob(&pattern) else {
                        continue;
                    };
                    for path in matches.filter_map(Result::ok) {
                        let rel = path.strip_prefix(repo_root).unwrap_or(&path);
                        let rel_str = rel.to_string_lossy();
                        if excludes.iter().any(|ex| ex.matches(&rel_str)) {
                            continue;
                        }
                        files.push(path);
                    }
                }
                files.sort();
                files
            }
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// External diagnostic tool normalized to findings.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the backing tool can run here at all.
    async fn available(&self) -> bool;

    async fn run(
        &self,
        repo_root: &Path,
        selection: &FileSelection,
    ) -> Result<Vec<Finding>, AnalyzerError>;
}

/// Probe for a tool by invoking it with a cheap argument.
pub(crate) async fn tool_responds(program: &str, probe_arg: &str) -> bool {
    matches!(
        Command::new(program).arg(probe_arg).output().await,
        Ok(output) if output.status.success()
    )
}

/// The analyzers policy enables for this run, in a fixed order.
pub fn enabled_analyzers(policy: &Policy, run_mode: RunMode) -> Vec<Box<dyn Analyzer>> {
    let mut analyzers: Vec<Box<dyn Analyzer>> = Vec::new();
    if policy.check_enabled(Shellcheck::NAME) {
        analyzers.push(Box::new(Shellcheck));
    }
    if policy.check_enabled(Yamllint::NAME) {
        analyzers.push(Box::new(Yamllint));
    }
    if policy.check_enabled(LlmReviewer::NAME) {
        match (&policy.llm.provider, run_mode) {
            (Some(provider), RunMode::Deep) => {
                analyzers
                    .push(Box::new(LlmReviewer::new(provider.clone(), policy.llm.model.clone())));
            }
            (Some(_), RunMode::Light) => {
                tracing::info!("skipping llm review (run_mode=light)");
            }
            (None, _) => {
                tracing::warn!("llm check enabled but no provider configured, skipping");
            }
        }
    }
    analyzers
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
