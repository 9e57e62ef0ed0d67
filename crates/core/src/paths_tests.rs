// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn explicit_roots_drive_all_paths() {
    let tree = StateTree::at("/tmp/state", "/tmp/config");
    assert_eq!(tree.queue_dir(), PathBuf::from("/tmp/state/queue"));
    assert_eq!(tree.events_dir(), PathBuf::from("/tmp/state/events"));
    assert_eq!(tree.logs_dir(), PathBuf::from("/tmp/state/logs"));
    assert_eq!(tree.pid_path(), PathBuf::from("/tmp/state/worker.pid"));
    assert_eq!(tree.policy_path(), PathBuf::from("/tmp/config/policy.yml"));
}

#[test]
fn ensure_creates_the_full_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let tree = StateTree::at(tmp.path().join("state"), tmp.path().join("config"));
    tree.ensure().unwrap();

    assert!(tree.queue_dir().is_dir());
    assert!(tree.events_dir().is_dir());
    assert!(tree.logs_dir().is_dir());
    assert!(tree.config_dir().is_dir());
}

#[test]
fn ensure_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let tree = StateTree::at(tmp.path().join("state"), tmp.path().join("config"));
    tree.ensure().unwrap();
    tree.ensure().unwrap();
}

#[test]
#[serial]
fn state_home_env_overrides_xdg() {
    std::env::set_var(STATE_HOME_ENV, "/custom/state");
    std::env::set_var("XDG_STATE_HOME", "/xdg/state");
    let tree = StateTree::resolve();
    std::env::remove_var(STATE_HOME_ENV);
    std::env::remove_var("XDG_STATE_HOME");

    assert_eq!(tree.state_dir(), Path::new("/custom/state"));
}

#[test]
#[serial]
fn xdg_state_home_gets_sichter_suffix() {
    std::env::remove_var(STATE_HOME_ENV);
    std::env::set_var("XDG_STATE_HOME", "/xdg/state");
    let tree = StateTree::resolve();
    std::env::remove_var("XDG_STATE_HOME");

    assert_eq!(tree.state_dir(), Path::new("/xdg/state/sichter"));
}
