// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker main loop: drain the queue in order, wait for changes when idle.
//!
//! Job files are unlinked after processing regardless of outcome: a job
//! file exists exactly while the job is live. Failures become events;
//! nothing escapes the loop except cancellation.

use async_trait::async_trait;
use sichter_core::{Clock, Event, EventKind, Job};
use sichter_storage::{EventLog, JobQueue};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::watcher::DirectoryWatcher;

const WAIT_TIMEOUT: Duration = Duration::from_secs(10);
const SCAN_RETRY: Duration = Duration::from_secs(2);
pub const POST_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// One job's worth of work. Implementations own all per-job error
/// handling; only the supervisor's bookkeeping lives outside.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job);
}

pub struct Supervisor<C> {
    queue: JobQueue,
    events: EventLog,
    handler: Arc<dyn JobHandler>,
    watcher: Arc<dyn DirectoryWatcher>,
    /// Optional script run after each processed job, bounded and fallible
    /// without consequence.
    post_hook: Option<PathBuf>,
    clock: C,
}

impl<C: Clock> Supervisor<C> {
    pub fn new(
        queue: JobQueue,
        events: EventLog,
        handler: Arc<dyn JobHandler>,
        watcher: Arc<dyn DirectoryWatcher>,
        post_hook: Option<PathBuf>,
        clock: C,
    ) -> Self {
        Self { queue, events, handler, watcher, post_hook, clock }
    }

    fn emit(&self, kind: EventKind) {
        let event = Event::new(&self.clock, kind);
        if let Err(err) = self.events.append(&event) {
            tracing::warn!(%err, "failed to append event");
        }
    }

    /// Run until cancelled; with `once`, drain the current queue and stop.
    pub async fn run(&self, shutdown: CancellationToken, once: bool) {
        self.emit(EventKind::Start {
            message: format!("worker started (pid={})", std::process::id()),
        });
        tracing::info!("worker started");

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let files = match self.queue.scan() {
                Ok(files) => files,
                Err(err) => {
                    tracing::error!(%err, "queue scan failed");
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(SCAN_RETRY) => continue,
                    }
                }
            };

            if files.is_empty() {
                if once {
                    break;
                }
                self.wait_for_queue_change(&shutdown).await;
                continue;
            }

            for path in files {
                if shutdown.is_cancelled() {
                    break;
                }
                self.process_file(&path).await;
            }
        }

        self.emit(EventKind::Stop { message: "worker stopped".to_string() });
        tracing::info!("worker stopped");
    }

    async fn process_file(&self, path: &Path) {
        let file_name =
            path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

        match self.queue.load(path) {
            Ok(job) => self.handler.handle(&job).await,
            Err(err) => {
                tracing::error!(file = file_name, %err, "unreadable job file");
                self.emit(EventKind::Error { message: format!("Job {file_name} failed: {err}") });
            }
        }

        // Terminal either way; the file must not be picked up again.
        if let Err(err) = self.queue.remove(path) {
            tracing::warn!(file = file_name, %err, "failed to remove job file");
        }

        self.run_post_hook().await;
    }

    /// Block on the directory watcher (on the blocking pool), bounded by a
    /// timeout and interruptible by shutdown.
    async fn wait_for_queue_change(&self, shutdown: &CancellationToken) {
        let watcher = Arc::clone(&self.watcher);
        let dir = self.queue.dir().to_path_buf();
        let queue = self.queue.clone();

        let wait = tokio::task::spawn_blocking(move || {
            let ready = move || queue.scan().map(|files| !files.is_empty()).unwrap_or(false);
            watcher.wait_for_change(&dir, WAIT_TIMEOUT, &ready)
        });

        tokio::select! {
            () = shutdown.cancelled() => {}
            _ = wait => {}
        }
    }

    async fn run_post_hook(&self) {
        let Some(hook) = &self.post_hook else {
            return;
        };
        if !hook.exists() {
            return;
        }

        let run = tokio::process::Command::new(hook).kill_on_drop(true).output();
        match tokio::time::timeout(POST_HOOK_TIMEOUT, run).await {
            Ok(Ok(output)) if output.status.success() => {}
            Ok(Ok(output)) => {
                tracing::warn!(hook = %hook.display(), status = %output.status, "post hook failed");
            }
            Ok(Err(err)) => {
                tracing::warn!(hook = %hook.display(), %err, "post hook could not run");
            }
            Err(_elapsed) => {
                tracing::warn!(hook = %hook.display(), "post hook timed out");
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
