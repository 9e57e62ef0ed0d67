// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn finding(file: &str, rule: &str, message: &str) -> Finding {
    Finding::new(Severity::Warning, Category::Style, file, Some(3), message).with_rule_id(rule)
}

#[test]
fn dedupe_key_combines_category_file_rule_message() {
    let f = finding("a.sh", "SC2086", "quote this");
    assert_eq!(f.dedupe_key, "style:a.sh:SC2086:quote this");
}

#[test]
fn dedupe_key_truncates_message_to_50_chars() {
    let long = "x".repeat(80);
    let f = finding("a.sh", "SC1", &long);
    assert_eq!(f.dedupe_key, format!("style:a.sh:SC1:{}", "x".repeat(50)));
}

#[test]
fn dedupe_key_with_no_rule_leaves_slot_empty() {
    let f = Finding::new(Severity::Error, Category::Correctness, "b.yml", None, "bad");
    assert_eq!(f.dedupe_key, "correctness:b.yml::bad");
}

#[test]
fn grouping_preserves_first_seen_order() {
    let findings = vec![
        finding("a.sh", "SC1", "first"),
        finding("b.sh", "SC2", "second"),
        finding("a.sh", "SC1", "first"),
        finding("c.sh", "SC3", "third"),
    ];
    let grouped = dedupe_findings(findings);

    let keys: Vec<&String> = grouped.keys().collect();
    assert_eq!(keys.len(), 3);
    assert!(keys[0].contains("first"));
    assert!(keys[1].contains("second"));
    assert!(keys[2].contains("third"));
    assert_eq!(grouped[keys[0]].len(), 2);
}

#[test]
fn group_count_never_exceeds_finding_count() {
    let findings: Vec<Finding> =
        (0..10).map(|i| finding("a.sh", "SC1", if i % 2 == 0 { "even" } else { "odd" })).collect();
    let total = findings.len();
    let grouped = dedupe_findings(findings);
    assert!(grouped.len() <= total);
    assert_eq!(grouped.len(), 2);
}

proptest::proptest! {
    #[test]
    fn grouping_never_grows_and_keeps_first_seen_order(
        keys in proptest::collection::vec(0u8..5, 0..40)
    ) {
        let findings: Vec<Finding> = keys
            .iter()
            .map(|k| finding("f.sh", &format!("SC{k}"), "msg"))
            .collect();
        let total = findings.len();
        let grouped = dedupe_findings(findings);

        proptest::prop_assert!(grouped.len() <= total);

        // Group order must match the order in which keys first appeared.
        let mut first_seen = Vec::new();
        for k in &keys {
            let key = format!("style:f.sh:SC{k}:msg");
            if !first_seen.contains(&key) {
                first_seen.push(key);
            }
        }
        let group_keys: Vec<String> = grouped.keys().cloned().collect();
        proptest::prop_assert_eq!(group_keys, first_seen);
    }
}

#[test]
fn finding_round_trips_through_json() {
    let f = finding("a.sh", "SC2086", "quote this").with_tool("shellcheck").with_fix_available(true);
    let json = serde_json::to_string(&f).unwrap();
    let back: Finding = serde_json::from_str(&json).unwrap();
    assert_eq!(back, f);
}
