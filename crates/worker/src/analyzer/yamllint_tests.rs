// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_warning_with_rule() {
    let finding =
        parse_line("deploy.yml:14:3: [warning] wrong indentation: expected 2 but found 4 (indentation)")
            .unwrap();
    assert_eq!(finding.severity, Severity::Warning);
    assert_eq!(finding.category, Category::Style);
    assert_eq!(finding.file, "deploy.yml");
    assert_eq!(finding.line, Some(14));
    assert_eq!(finding.message, "wrong indentation: expected 2 but found 4");
    assert_eq!(finding.rule_id.as_deref(), Some("indentation"));
    assert_eq!(finding.tool.as_deref(), Some("yamllint"));
}

#[test]
fn parses_error_without_rule() {
    let finding = parse_line("ci.yaml:1:1: [error] syntax error: found character '\\t'").unwrap();
    assert_eq!(finding.severity, Severity::Error);
    assert!(finding.rule_id.is_none());
}

#[test]
fn rejects_unknown_level_and_garbage() {
    assert!(parse_line("ci.yaml:1:1: [notice] something").is_none());
    assert!(parse_line("completely unrelated output").is_none());
    assert!(parse_line("").is_none());
}

#[test]
fn parse_output_skips_bad_lines_and_keeps_good() {
    let stdout = "\
a.yml:1:1: [error] boom (rule-a)
not a diagnostic
b.yml:2:1: [warning] hmm (rule-b)
";
    let findings = parse_output(stdout);
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].file, "a.yml");
    assert_eq!(findings[1].file, "b.yml");
}
