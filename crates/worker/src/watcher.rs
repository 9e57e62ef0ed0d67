// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-change waiting for the queue directory.
//!
//! The preferred implementation uses inotify-style notification; every
//! failure path degrades to a short sleep so the worker loop keeps making
//! progress on platforms or mounts where notification is unavailable.

use notify::{RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

/// Fallback pause when no notification primitive is usable.
pub const POLL_FALLBACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Something in the directory changed.
    Changed,
    /// The ready-check fired after the watch was established; the caller
    /// should rescan immediately.
    Ready,
    /// Nothing happened within the timeout.
    TimedOut,
}

/// Blocking wait for activity in a directory.
///
/// `already_ready` is evaluated after the watch is registered, closing the
/// race where a file lands between the caller's scan and the watch start.
pub trait DirectoryWatcher: Send + Sync {
    fn wait_for_change(
        &self,
        dir: &Path,
        timeout: Duration,
        already_ready: &(dyn Fn() -> bool + Sync),
    ) -> WaitOutcome;
}

/// Notification-based watcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatcher;

impl DirectoryWatcher for NotifyWatcher {
    fn wait_for_change(
        &self,
        dir: &Path,
        timeout: Duration,
        already_ready: &(dyn Fn() -> bool + Sync),
    ) -> WaitOutcome {
        let (tx, rx) = mpsc::channel();
        let mut watcher = match notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if res.is_ok() {
                let _ = tx.send(());
            }
        }) {
            Ok(watcher) => watcher,
            Err(err) => {
                tracing::warn!(%err, "filesystem notifier unavailable, falling back to polling");
                return PollWatcher.wait_for_change(dir, timeout, already_ready);
            }
        };

        if let Err(err) = watcher.watch(dir, RecursiveMode::NonRecursive) {
            tracing::warn!(dir = %dir.display(), %err, "watch failed, falling back to polling");
            return PollWatcher.wait_for_change(dir, timeout, already_ready);
        }

        if already_ready() {
            return WaitOutcome::Ready;
        }

        match rx.recv_timeout(timeout) {
            Ok(()) => WaitOutcome::Changed,
            Err(mpsc::RecvTimeoutError::Timeout) => WaitOutcome::TimedOut,
            Err(mpsc::RecvTimeoutError::Disconnected) => WaitOutcome::TimedOut,
        }
    }
}

/// Plain-sleep fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollWatcher;

impl DirectoryWatcher for PollWatcher {
    fn wait_for_change(
        &self,
        _dir: &Path,
        timeout: Duration,
        already_ready: &(dyn Fn() -> bool + Sync),
    ) -> WaitOutcome {
        if already_ready() {
            return WaitOutcome::Ready;
        }
        std::thread::sleep(timeout.min(POLL_FALLBACK));
        WaitOutcome::TimedOut
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
