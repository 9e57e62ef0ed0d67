// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured diagnostics produced by analyzers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
    Question,
}

crate::simple_display! {
    Severity {
        Info => "info",
        Warning => "warning",
        Error => "error",
        Critical => "critical",
        Question => "question",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Style,
    Correctness,
    Security,
    Maintainability,
    Drift,
}

crate::simple_display! {
    Category {
        Style => "style",
        Correctness => "correctness",
        Security => "security",
        Maintainability => "maintainability",
        Drift => "drift",
    }
}

/// One diagnostic from one tool, normalized across analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub fix_available: bool,
    /// Derived identity used to group near-duplicates. Filled on
    /// construction when empty.
    #[serde(default)]
    pub dedupe_key: String,
}

impl Finding {
    pub fn new(
        severity: Severity,
        category: Category,
        file: impl Into<String>,
        line: Option<u32>,
        message: impl Into<String>,
    ) -> Self {
        let file = file.into();
        let message = message.into();
        let mut finding = Self {
            severity,
            category,
            file,
            line,
            message,
            tool: None,
            rule_id: None,
            fix_available: false,
            dedupe_key: String::new(),
        };
        finding.dedupe_key = finding.derive_dedupe_key();
        finding
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self.dedupe_key = self.derive_dedupe_key();
        self
    }

    pub fn with_fix_available(mut self, fix_available: bool) -> Self {
        self.fix_available = fix_available;
        self
    }

    /// Fill the dedupe key when a producer (external tool output) left it
    /// empty.
    pub fn ensure_dedupe_key(&mut self) {
        if self.dedupe_key.is_empty() {
            self.dedupe_key = self.derive_dedupe_key();
        }
    }

    /// `category:file:rule_id:message[..50]`, message truncated to 50 chars.
    fn derive_dedupe_key(&self) -> String {
        let rule = self.rule_id.as_deref().unwrap_or("");
        let head: String = self.message.chars().take(50).collect();
        format!("{}:{}:{}:{}", self.category, self.file, rule, head)
    }
}

/// Group findings by `dedupe_key`, preserving first-seen order.
pub fn dedupe_findings(findings: impl IntoIterator<Item = Finding>) -> IndexMap<String, Vec<Finding>> {
    let mut grouped: IndexMap<String, Vec<Finding>> = IndexMap::new();
    for finding in findings {
        grouped.entry(finding.dedupe_key.clone()).or_default().push(finding);
    }
    grouped
}

#[cfg(test)]
#[path = "finding_tests.rs"]
mod tests;
