// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

#[test]
fn whole_selection_walks_by_extension_and_applies_excludes() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "bin/run.sh");
    touch(tmp.path(), "vendor/skip.sh");
    touch(tmp.path(), "docs/readme.md");
    touch(tmp.path(), "deep/nested/also.sh");

    let selection =
        FileSelection::Whole { excludes: vec![Pattern::new("vendor/**").unwrap()] };
    let files = selection.candidates(tmp.path(), &["sh"]);

    let rels: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(tmp.path()).unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(rels, ["bin/run.sh", "deep/nested/also.sh"]);
}

#[test]
fn paths_selection_filters_by_extension_only() {
    let selection = FileSelection::Paths(vec![
        PathBuf::from("a.sh"),
        PathBuf::from("b.yml"),
        PathBuf::from("c.SH"),
        PathBuf::from("noext"),
    ]);
    let files = selection.candidates(Path::new("/repo"), &["sh"]);
    assert_eq!(files, [PathBuf::from("a.sh"), PathBuf::from("c.SH")]);
}

#[test]
fn registry_respects_policy_checks() {
    let policy = sichter_core::Policy::from_value(
        &serde_yaml::from_str("checks:\n  shellcheck: true\n  yamllint: false\n").unwrap(),
    );
    let analyzers = enabled_analyzers(&policy, RunMode::Deep);
    let names: Vec<&str> = analyzers.iter().map(|a| a.name()).collect();
    assert_eq!(names, ["shellcheck"]);
}

#[test]
fn llm_requires_deep_mode_and_provider() {
    let with_provider = sichter_core::Policy::from_value(
        &serde_yaml::from_str("checks:\n  llm: true\nllm:\n  provider: reviewer\n").unwrap(),
    );
    let deep = enabled_analyzers(&with_provider, RunMode::Deep);
    assert_eq!(deep.len(), 1);
    assert_eq!(deep[0].name(), "llm");

    let light = enabled_analyzers(&with_provider, RunMode::Light);
    assert!(light.is_empty());

    let no_provider = sichter_core::Policy::from_value(
        &serde_yaml::from_str("checks:\n  llm: true\n").unwrap(),
    );
    assert!(enabled_analyzers(&no_provider, RunMode::Deep).is_empty());
}
