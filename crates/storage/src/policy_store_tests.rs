// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::fs;

fn store_in(dir: &Path) -> PolicyStore {
    PolicyStore::new(dir.join("policy.yml"))
}

#[test]
fn missing_file_reads_as_null_and_default_policy() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());

    assert_eq!(store.read_raw().unwrap(), serde_yaml::Value::Null);
    assert!(store.load().auto_pr);
}

#[test]
fn empty_file_reads_as_null() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());
    fs::write(store.path(), "  \n").unwrap();

    assert_eq!(store.read_raw().unwrap(), serde_yaml::Value::Null);
}

#[test]
fn write_then_read_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());

    store.write(&json!({"auto_pr": false, "org": "acme"})).unwrap();

    let policy = store.load();
    assert!(!policy.auto_pr);
    assert_eq!(policy.org, "acme");
}

#[test]
fn write_replaces_previous_document_wholesale() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());

    store.write(&json!({"auto_pr": false, "run_mode": "light"})).unwrap();
    store.write(&json!({"org": "acme"})).unwrap();

    let policy = store.load();
    assert_eq!(policy.org, "acme");
    // Old keys are gone, defaults apply again.
    assert!(policy.auto_pr);
    assert_eq!(policy.run_mode, sichter_core::RunMode::Deep);
}

#[test]
fn write_leaves_no_temporary_siblings() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());
    store.write(&json!({"auto_pr": true})).unwrap();

    let names: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["policy.yml"]);
}

#[test]
fn write_creates_missing_config_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let store = PolicyStore::new(tmp.path().join("deep/nested/policy.yml"));
    store.write(&json!({"org": "acme"})).unwrap();
    assert_eq!(store.load().org, "acme");
}

#[test]
fn unparseable_yaml_loads_as_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());
    fs::write(store.path(), "auto_pr: [unclosed").unwrap();

    let policy = store.load();
    assert!(policy.auto_pr);
}
