// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed view over the operator policy document.
//!
//! The on-disk policy is weakly typed YAML edited by hand; every accessor
//! tolerates missing keys and logs-and-defaults on nonsense values instead
//! of failing the caller.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

pub const DEFAULT_ORG: &str = "heimgewebe";

/// Analysis depth for a repository pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Deep,
    Light,
}

crate::simple_display! {
    RunMode {
        Deep => "deep",
        Light => "light",
    }
}

impl RunMode {
    fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deep" => RunMode::Deep,
            "light" => RunMode::Light,
            other => {
                tracing::warn!(value = other, "unrecognized run_mode in policy, using deep");
                RunMode::Deep
            }
        }
    }
}

/// LLM reviewer configuration. Opaque beyond the provider command.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LlmPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Recognized policy options with their documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub auto_pr: bool,
    pub sweep_on_omnipull: bool,
    pub run_mode: RunMode,
    pub org: String,
    pub llm: LlmPolicy,
    /// Analyzer name → enabled. Absent analyzers are disabled.
    pub checks: IndexMap<String, bool>,
    /// Glob patterns excluding paths from analysis, in document order.
    pub excludes: Vec<String>,
    /// `org/name` entries naming the repositories under management, in
    /// document order. Read by status views, not by the job pipeline.
    pub allowlist: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            auto_pr: true,
            sweep_on_omnipull: true,
            run_mode: RunMode::Deep,
            org: DEFAULT_ORG.to_string(),
            llm: LlmPolicy::default(),
            checks: IndexMap::new(),
            excludes: Vec::new(),
            allowlist: Vec::new(),
        }
    }
}

impl Policy {
    /// Build the typed view from a raw YAML document. `Null` (empty or
    /// missing file) yields all defaults.
    pub fn from_value(values: &Value) -> Self {
        let defaults = Policy::default();
        Self {
            auto_pr: bool_field(values, "auto_pr", defaults.auto_pr),
            sweep_on_omnipull: bool_field(values, "sweep_on_omnipull", defaults.sweep_on_omnipull),
            run_mode: values
                .get("run_mode")
                .and_then(Value::as_str)
                .map(RunMode::parse_or_default)
                .unwrap_or_default(),
            org: values
                .get("org")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.org),
            llm: llm_field(values),
            checks: checks_field(values),
            excludes: string_seq(values, "excludes"),
            allowlist: string_seq(values, "allowlist"),
        }
    }

    pub fn check_enabled(&self, name: &str) -> bool {
        self.checks.get(name).copied().unwrap_or(false)
    }
}

/// Coerce a weakly-typed policy value to a boolean.
///
/// Accepts native booleans and the strings true/1/yes/y/on and
/// false/0/no/n/off (case-insensitive). Explicit null is "unset". Anything
/// else is logged and the supplied default applies.
pub fn coerce_bool(value: &Value, default: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => default,
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "on" => true,
            "false" | "0" | "no" | "n" | "off" => false,
            other => {
                tracing::warn!(value = other, "unrecognized boolean string in policy, using default");
                default
            }
        },
        other => {
            tracing::warn!(?other, "unrecognized boolean value in policy, using default");
            default
        }
    }
}

fn bool_field(values: &Value, key: &str, default: bool) -> bool {
    values.get(key).map_or(default, |v| coerce_bool(v, default))
}

fn llm_field(values: &Value) -> LlmPolicy {
    let Some(raw) = values.get("llm") else {
        return LlmPolicy::default();
    };
    LlmPolicy {
        provider: raw.get("provider").and_then(Value::as_str).map(str::to_string),
        model: raw.get("model").and_then(Value::as_str).map(str::to_string),
    }
}

fn checks_field(values: &Value) -> IndexMap<String, bool> {
    let mut checks = IndexMap::new();
    let Some(Value::Mapping(raw)) = values.get("checks") else {
        return checks;
    };
    for (key, value) in raw {
        let Some(name) = key.as_str() else {
            tracing::warn!(?key, "non-string analyzer name in policy checks, skipping");
            continue;
        };
        checks.insert(name.to_string(), coerce_bool(value, false));
    }
    checks
}

fn string_seq(values: &Value, key: &str) -> Vec<String> {
    let Some(Value::Sequence(raw)) = values.get(key) else {
        return Vec::new();
    };
    raw.iter()
        .filter_map(|v| match v.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                tracing::warn!(key, ?v, "non-string entry in policy sequence, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
