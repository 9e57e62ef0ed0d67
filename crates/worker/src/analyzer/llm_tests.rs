// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_finding_lines_and_fills_tool() {
    let stdout = r#"{"severity":"warning","category":"maintainability","file":"src/lib.rs","line":10,"message":"function too long"}
{"severity":"question","category":"drift","file":"README.md","message":"doc mentions removed flag","tool":"claude"}"#;

    let findings = parse_jsonl(stdout);
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].tool.as_deref(), Some("llm"));
    assert_eq!(findings[1].tool.as_deref(), Some("claude"));
    assert_eq!(
        findings[0].dedupe_key,
        "maintainability:src/lib.rs::function too long"
    );
}

#[test]
fn skips_unparseable_lines() {
    let stdout = "thinking out loud...\n{\"severity\":\"info\",\"category\":\"style\",\"file\":\"a\",\"message\":\"m\"}\nnot json";
    let findings = parse_jsonl(stdout);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].file, "a");
}

#[test]
fn empty_output_is_empty() {
    assert!(parse_jsonl("").is_empty());
    assert!(parse_jsonl("\n\n").is_empty());
}
