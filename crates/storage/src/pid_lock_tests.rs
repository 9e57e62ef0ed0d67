// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;

fn lock_path(tmp: &tempfile::TempDir) -> PathBuf {
    tmp.path().join("worker.pid")
}

/// A PID that is certainly dead: spawn a short-lived child and reap it.
fn dead_pid() -> i32 {
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let pid = child.id() as i32;
    child.wait().unwrap();
    pid
}

#[test]
fn acquire_writes_own_pid() {
    let tmp = tempfile::tempdir().unwrap();
    let path = lock_path(&tmp);

    let lock = PidLock::acquire(&path).unwrap();
    assert!(matches!(lock, PidLock::Acquired(_)));
    assert_eq!(read_pid(&path), Some(std::process::id() as i32));
}

#[test]
fn drop_removes_the_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = lock_path(&tmp);

    let lock = PidLock::acquire(&path).unwrap();
    drop(lock);
    assert!(!path.exists());
}

#[test]
fn stale_pid_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let path = lock_path(&tmp);
    fs::write(&path, format!("{}\n", dead_pid())).unwrap();

    let lock = PidLock::acquire(&path).unwrap();
    assert!(matches!(lock, PidLock::Acquired(_)));
    assert_eq!(read_pid(&path), Some(std::process::id() as i32));
}

#[test]
fn unparseable_pid_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let path = lock_path(&tmp);
    fs::write(&path, "not-a-pid\n").unwrap();

    let lock = PidLock::acquire(&path).unwrap();
    assert!(matches!(lock, PidLock::Acquired(_)));
}

#[test]
fn live_holder_wins_and_file_is_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let path = lock_path(&tmp);

    let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
    let child_pid = child.id() as i32;
    fs::write(&path, format!("{child_pid}\n")).unwrap();

    let outcome = PidLock::acquire(&path).unwrap();
    match outcome {
        PidLock::AlreadyRunning { pid } => assert_eq!(pid, child_pid),
        PidLock::Acquired(_) => panic!("expected the live holder to win"),
    }
    assert_eq!(read_pid(&path), Some(child_pid));

    child.kill().unwrap();
    child.wait().unwrap();
}

#[test]
fn process_alive_detects_self_and_dead() {
    assert!(process_alive(std::process::id() as i32));
    assert!(!process_alive(dead_pid()));
}
