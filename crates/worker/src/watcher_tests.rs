// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Instant;

#[test]
fn poll_watcher_times_out_quickly() {
    let tmp = tempfile::tempdir().unwrap();
    let start = Instant::now();
    let outcome = PollWatcher.wait_for_change(tmp.path(), Duration::from_millis(50), &|| false);
    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn poll_watcher_honors_ready_check() {
    let tmp = tempfile::tempdir().unwrap();
    let outcome = PollWatcher.wait_for_change(tmp.path(), Duration::from_secs(5), &|| true);
    assert_eq!(outcome, WaitOutcome::Ready);
}

#[test]
fn notify_watcher_sees_a_new_file() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_path_buf();

    let writer = std::thread::spawn({
        let dir = dir.clone();
        move || {
            std::thread::sleep(Duration::from_millis(200));
            std::fs::write(dir.join("job.json"), "{}").unwrap();
        }
    });

    let outcome = NotifyWatcher.wait_for_change(&dir, Duration::from_secs(10), &|| false);
    writer.join().unwrap();
    assert_eq!(outcome, WaitOutcome::Changed);
}

#[test]
fn notify_watcher_ready_check_closes_the_race() {
    let tmp = tempfile::tempdir().unwrap();
    // File already present when the wait starts: the post-watch re-check
    // must return immediately instead of blocking for the timeout.
    std::fs::write(tmp.path().join("early.json"), "{}").unwrap();

    let start = Instant::now();
    let outcome = NotifyWatcher.wait_for_change(tmp.path(), Duration::from_secs(10), &|| {
        tmp.path().join("early.json").exists()
    });
    assert_eq!(outcome, WaitOutcome::Ready);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn notify_watcher_times_out_when_idle() {
    let tmp = tempfile::tempdir().unwrap();
    let outcome = NotifyWatcher.wait_for_change(tmp.path(), Duration::from_millis(100), &|| false);
    assert_eq!(outcome, WaitOutcome::TimedOut);
}

#[test]
fn missing_directory_degrades_to_polling() {
    let tmp = tempfile::tempdir().unwrap();
    let gone = tmp.path().join("nope");
    let start = Instant::now();
    let outcome = NotifyWatcher.wait_for_change(&gone, Duration::from_millis(100), &|| false);
    assert_eq!(outcome, WaitOutcome::TimedOut);
    // Fallback sleeps the poll interval at most.
    assert!(start.elapsed() < Duration::from_secs(5));
}
