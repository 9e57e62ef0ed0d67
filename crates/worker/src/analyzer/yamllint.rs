// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML linter adapter (`yamllint -f parsable`).

use super::{tool_responds, Analyzer, AnalyzerError, FileSelection};
use async_trait::async_trait;
use sichter_core::{Category, Finding, Severity};
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, Default)]
pub struct Yamllint;

impl Yamllint {
    pub const NAME: &'static str = "yamllint";
}

/// Parse one parsable-format line: `path:line:col: [level] message (rule)`.
pub(crate) fn parse_line(line: &str) -> Option<Finding> {
    let (path, rest) = line.split_once(':')?;
    let (line_no, rest) = rest.split_once(':')?;
    let (_col, rest) = rest.split_once(':')?;
    let rest = rest.trim_start();

    let level_body = rest.strip_prefix('[')?;
    let (level, message) = level_body.split_once(']')?;
    let message = message.trim();

    let (message, rule) = match message.rsplit_once(" (") {
        Some((head, tail)) if tail.ends_with(')') => {
            (head.trim(), Some(tail.trim_end_matches(')').to_string()))
        }
        _ => (message, None),
    };

    let severity = match level {
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        _ => return None,
    };

    let mut finding = Finding::new(
        severity,
        Category::Style,
        path.trim(),
        line_no.trim().parse().ok(),
        message,
    )
    .with_tool(Yamllint::NAME);
    if let Some(rule) = rule {
        finding = finding.with_rule_id(rule);
    }
    Some(finding)
}

pub(crate) fn parse_output(stdout: &str) -> Vec<Finding> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_line(line) {
            Some(finding) => Some(finding),
            None => {
                tracing::debug!(line, "unparseable yamllint line, skipping");
                None
            }
        })
        .collect()
}

#[async_trait]
impl Analyzer for Yamllint {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn available(&self) -> bool {
        tool_responds("yamllint", "--version").await
    }

    async fn run(
        &self,
        repo_root: &Path,
        selection: &FileSelection,
    ) -> Result<Vec<Finding>, AnalyzerError> {
        let files = selection.candidates(repo_root, &["yml", "yaml"]);
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let output = Command::new("yamllint")
            .args(["-f", "parsable"])
            .args(&files)
            .current_dir(repo_root)
            .output()
            .await?;
        Ok(parse_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
#[path = "yamllint_tests.rs"]
mod tests;
