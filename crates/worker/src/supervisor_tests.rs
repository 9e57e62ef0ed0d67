// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::watcher::PollWatcher;
use parking_lot::Mutex;
use sichter_core::{FakeClock, JobId, JobMode, JobType, RepoName};
use std::fs;

#[derive(Default)]
struct RecordingHandler {
    seen: Mutex<Vec<JobId>>,
}

#[async_trait]
impl JobHandler for RecordingHandler {
    async fn handle(&self, job: &Job) {
        self.seen.lock().push(job.job_id.clone());
    }
}

struct Fixture {
    _tmp: tempfile::TempDir,
    queue: JobQueue,
    events: EventLog,
    clock: FakeClock,
    handler: Arc<RecordingHandler>,
    hook: Option<PathBuf>,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let queue_dir = tmp.path().join("queue");
        let events_dir = tmp.path().join("events");
        fs::create_dir_all(&queue_dir).unwrap();
        fs::create_dir_all(&events_dir).unwrap();
        Fixture {
            queue: JobQueue::new(&queue_dir),
            events: EventLog::new(&events_dir),
            clock: FakeClock::new(),
            handler: Arc::new(RecordingHandler::default()),
            hook: None,
            _tmp: tmp,
        }
    }

    fn supervisor(&self) -> Supervisor<FakeClock> {
        Supervisor::new(
            self.queue.clone(),
            self.events.clone(),
            Arc::clone(&self.handler) as Arc<dyn JobHandler>,
            Arc::new(PollWatcher),
            self.hook.clone(),
            self.clock.clone(),
        )
    }

    fn enqueue_job(&self) -> Job {
        let job = Job::new(
            &self.clock,
            JobType::Repository,
            JobMode::Changed,
            Some(RepoName::parse("acme/widget").unwrap()),
        );
        self.queue.enqueue(&job, &self.events, &self.clock).unwrap();
        job
    }

    fn event_tags(&self) -> Vec<String> {
        self.events
            .tail(100, None)
            .unwrap()
            .into_iter()
            .filter_map(|r| r.kind)
            .collect()
    }
}

#[tokio::test]
async fn drains_jobs_in_fifo_order() {
    let fx = Fixture::new();
    let first = fx.enqueue_job();
    fx.clock.advance(Duration::from_secs(1));
    let second = fx.enqueue_job();

    fx.supervisor().run(CancellationToken::new(), true).await;

    let seen = fx.handler.seen.lock().clone();
    assert_eq!(seen, vec![first.job_id, second.job_id]);
    assert!(fx.queue.scan().unwrap().is_empty());
}

#[tokio::test]
async fn emits_start_and_stop_events() {
    let fx = Fixture::new();
    fx.supervisor().run(CancellationToken::new(), true).await;

    let tags = fx.event_tags();
    // Newest first: stop, then start.
    assert_eq!(tags.first().map(String::as_str), Some("stop"));
    assert!(tags.contains(&"start".to_string()));
}

#[tokio::test]
async fn unreadable_job_becomes_error_event_and_is_removed() {
    let fx = Fixture::new();
    let bad = fx.queue.dir().join("1748779200-zz.json");
    fs::write(&bad, "definitely not json").unwrap();

    fx.supervisor().run(CancellationToken::new(), true).await;

    assert!(!bad.exists());
    let records = fx.events.tail(100, None).unwrap();
    let error = records.iter().find(|r| r.kind.as_deref() == Some("error")).unwrap();
    assert!(error.payload["message"].as_str().unwrap().contains("1748779200-zz.json"));
    assert!(fx.handler.seen.lock().is_empty());
}

#[tokio::test]
async fn cancelled_supervisor_stops_promptly() {
    let fx = Fixture::new();
    let token = CancellationToken::new();
    token.cancel();

    tokio::time::timeout(Duration::from_secs(5), fx.supervisor().run(token, false))
        .await
        .expect("run should return quickly after cancellation");
}

#[tokio::test]
async fn post_hook_runs_after_each_job() {
    use std::os::unix::fs::PermissionsExt;

    let mut fx = Fixture::new();
    let marker = fx.queue.dir().parent().unwrap().join("hook-ran");
    let hook = fx.queue.dir().parent().unwrap().join("post-run");
    fs::write(&hook, format!("#!/bin/sh\ntouch {}\n", marker.display())).unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    fx.hook = Some(hook);

    fx.enqueue_job();
    fx.supervisor().run(CancellationToken::new(), true).await;

    assert!(marker.exists());
}

#[tokio::test]
async fn failing_post_hook_is_swallowed() {
    use std::os::unix::fs::PermissionsExt;

    let mut fx = Fixture::new();
    let hook = fx.queue.dir().parent().unwrap().join("post-run");
    fs::write(&hook, "#!/bin/sh\nexit 7\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    fx.hook = Some(hook);

    fx.enqueue_job();
    fx.supervisor().run(CancellationToken::new(), true).await;

    // The job was still processed and removed.
    assert_eq!(fx.handler.seen.lock().len(), 1);
    assert!(fx.queue.scan().unwrap().is_empty());
}
