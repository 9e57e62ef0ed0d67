// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sichter_core::{FakeClock, JobMode, JobType, RepoName};
use std::fs;

struct Fixture {
    _tmp: tempfile::TempDir,
    queue: JobQueue,
    log: EventLog,
    clock: FakeClock,
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let queue_dir = tmp.path().join("queue");
    let events_dir = tmp.path().join("events");
    fs::create_dir_all(&queue_dir).unwrap();
    fs::create_dir_all(&events_dir).unwrap();
    Fixture {
        queue: JobQueue::new(&queue_dir),
        log: EventLog::new(&events_dir),
        clock: FakeClock::new(),
        _tmp: tmp,
    }
}

fn sample_job(clock: &FakeClock) -> Job {
    Job::new(clock, JobType::Repository, JobMode::Changed, Some(RepoName::parse("acme/widget").unwrap()))
}

#[test]
fn enqueue_creates_complete_file_under_job_id() {
    let fx = fixture();
    let job = sample_job(&fx.clock);

    let path = fx.queue.enqueue(&job, &fx.log, &fx.clock).unwrap();

    assert_eq!(path, fx.queue.dir().join(format!("{}.json", job.job_id)));
    let stored = fx.queue.load(&path).unwrap();
    assert_eq!(stored, job);
}

#[test]
fn enqueue_leaves_no_temporary_files() {
    let fx = fixture();
    fx.queue.enqueue(&sample_job(&fx.clock), &fx.log, &fx.clock).unwrap();

    let leftovers: Vec<_> = fs::read_dir(fx.queue.dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn enqueue_emits_queue_event_with_payload() {
    let fx = fixture();
    let job = sample_job(&fx.clock);
    fx.queue.enqueue(&job, &fx.log, &fx.clock).unwrap();

    let records = fx.log.tail(1, None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind.as_deref(), Some("queue"));
    assert_eq!(records[0].payload["job_id"], job.job_id.as_str());
    assert_eq!(records[0].payload["payload"]["repo"], "acme/widget");
}

#[test]
fn scan_returns_lexicographic_order() {
    let fx = fixture();
    fs::write(fx.queue.dir().join("1748779300-bb.json"), "{}").unwrap();
    fs::write(fx.queue.dir().join("1748779200-aa.json"), "{}").unwrap();
    fs::write(fx.queue.dir().join("1748779200-zz.json"), "{}").unwrap();

    let names: Vec<String> = fx
        .queue
        .scan()
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["1748779200-aa.json", "1748779200-zz.json", "1748779300-bb.json"]);
}

#[test]
fn scan_ignores_non_json_hidden_and_directories() {
    let fx = fixture();
    fs::write(fx.queue.dir().join("keep.json"), "{}").unwrap();
    fs::write(fx.queue.dir().join("skip.txt"), "").unwrap();
    fs::write(fx.queue.dir().join(".hidden.json.tmp-1"), "").unwrap();
    fs::create_dir(fx.queue.dir().join("dir.json")).unwrap();

    let files = fx.queue.scan().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("keep.json"));
}

#[test]
fn scan_ignores_symlinked_files() {
    let fx = fixture();
    let outside = fx.queue.dir().parent().unwrap().join("outside.json");
    fs::write(&outside, "{}").unwrap();
    std::os::unix::fs::symlink(&outside, fx.queue.dir().join("link.json")).unwrap();

    assert!(fx.queue.scan().unwrap().is_empty());
}

#[test]
fn scan_of_missing_dir_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let queue = JobQueue::new(tmp.path().join("nope"));
    assert!(queue.scan().unwrap().is_empty());
}

#[test]
fn remove_is_idempotent() {
    let fx = fixture();
    let path = fx.queue.enqueue(&sample_job(&fx.clock), &fx.log, &fx.clock).unwrap();

    fx.queue.remove(&path).unwrap();
    fx.queue.remove(&path).unwrap();
    assert!(fx.queue.scan().unwrap().is_empty());
}

#[test]
fn state_reports_size_and_newest_entries() {
    let fx = fixture();
    for _ in 0..3 {
        let job = sample_job(&fx.clock);
        fx.queue.enqueue(&job, &fx.log, &fx.clock).unwrap();
        fx.clock.advance(std::time::Duration::from_secs(1));
    }

    let state = fx.queue.state(2).unwrap();
    assert_eq!(state.size, 3);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[0].kind.as_deref(), Some("repository"));
    assert_eq!(state.items[0].repo.as_deref(), Some("acme/widget"));
    assert!(state.items[0].id < state.items[1].id);
}

#[test]
fn state_tolerates_unparseable_job_files() {
    let fx = fixture();
    fs::write(fx.queue.dir().join("1748779200-xx.json"), "not json").unwrap();

    let state = fx.queue.state(10).unwrap();
    assert_eq!(state.size, 1);
    assert_eq!(state.items[0].id, "1748779200-xx");
    assert!(state.items[0].kind.is_none());
}
