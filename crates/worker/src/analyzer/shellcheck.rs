// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell linter adapter (`shellcheck -f json1`).

use super::{tool_responds, Analyzer, AnalyzerError, FileSelection};
use async_trait::async_trait;
use serde::Deserialize;
use sichter_core::{Category, Finding, Severity};
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, Default)]
pub struct Shellcheck;

impl Shellcheck {
    pub const NAME: &'static str = "shellcheck";
}

/// One entry of shellcheck's json1 `comments` array.
#[derive(Debug, Deserialize)]
struct Comment {
    file: String,
    line: u32,
    level: String,
    code: u64,
    message: String,
    #[serde(default)]
    fix: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Json1Output {
    #[serde(default)]
    comments: Vec<Comment>,
}

fn severity_for(level: &str) -> Severity {
    match level {
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        _ => Severity::Info,
    }
}

fn category_for(level: &str) -> Category {
    match level {
        "error" | "warning" => Category::Correctness,
        _ => Category::Style,
    }
}

/// Parse json1 output into findings. A body that is not the expected shape
/// yields no findings (logged), never an error.
pub(crate) fn parse_json1(stdout: &str) -> Vec<Finding> {
    let parsed: Json1Output = match serde_json::from_str(stdout) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(%err, "unparseable shellcheck output, skipping");
            return Vec::new();
        }
    };
    parsed
        .comments
        .into_iter()
        .map(|c| {
            let fix_available = c.fix.as_ref().is_some_and(|f| !f.is_null());
            Finding::new(
                severity_for(&c.level),
                category_for(&c.level),
                c.file,
                Some(c.line),
                c.message,
            )
            .with_tool(Shellcheck::NAME)
            .with_rule_id(format!("SC{}", c.code))
            .with_fix_available(fix_available)
        })
        .collect()
}

#[async_trait]
impl Analyzer for Shellcheck {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn available(&self) -> bool {
        tool_responds("shellcheck", "--version").await
    }

    async fn run(
        &self,
        repo_root: &Path,
        selection: &FileSelection,
    ) -> Result<Vec<Finding>, AnalyzerError> {
        let files = selection.candidates(repo_root, &["sh", "bash"]);
        if files.is_empty() {
            return Ok(Vec::new());
        }

        // shellcheck exits non-zero when it has comments; parse stdout
        // regardless of status.
        let output = Command::new("shellcheck")
            .args(["-x", "-f", "json1"])
            .args(&files)
            .current_dir(repo_root)
            .output()
            .await?;
        Ok(parse_json1(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
#[path = "shellcheck_tests.rs"]
mod tests;
