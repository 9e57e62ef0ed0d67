// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM reviewer adapter.
//!
//! The provider is an opaque command that receives the repository root and
//! prints findings as JSONL on stdout, one [`Finding`] object per line.
//! Only deep runs reach this analyzer; the registry enforces that.

use super::{tool_responds, Analyzer, AnalyzerError, FileSelection};
use async_trait::async_trait;
use sichter_core::Finding;
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct LlmReviewer {
    provider: String,
    model: Option<String>,
}

impl LlmReviewer {
    pub const NAME: &'static str = "llm";

    pub fn new(provider: String, model: Option<String>) -> Self {
        Self { provider, model }
    }
}

/// Parse JSONL findings. Lines that are not finding objects are logged and
/// skipped.
pub(crate) fn parse_jsonl(stdout: &str) -> Vec<Finding> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<Finding>(line) {
            Ok(mut finding) => {
                if finding.tool.is_none() {
                    finding.tool = Some(LlmReviewer::NAME.to_string());
                }
                finding.ensure_dedupe_key();
                Some(finding)
            }
            Err(err) => {
                tracing::warn!(%err, line, "unparseable llm finding line, skipping");
                None
            }
        })
        .collect()
}

#[async_trait]
impl Analyzer for LlmReviewer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn available(&self) -> bool {
        tool_responds(&self.provider, "--version").await
    }

    async fn run(
        &self,
        repo_root: &Path,
        _selection: &FileSelection,
    ) -> Result<Vec<Finding>, AnalyzerError> {
        let mut command = Command::new(&self.provider);
        if let Some(model) = &self.model {
            command.args(["--model", model]);
        }
        let output = command.arg(repo_root).output().await?;
        if !output.status.success() {
            tracing::warn!(
                provider = self.provider,
                status = %output.status,
                "llm provider exited non-zero, ignoring its output"
            );
            return Ok(Vec::new());
        }
        Ok(parse_jsonl(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
