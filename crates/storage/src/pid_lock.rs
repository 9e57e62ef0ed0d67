// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PID-file mutual exclusion for the worker.
//!
//! The lock is the presence of a file naming a live process. A stale file
//! (dead or unparseable PID) is replaced; a live one means another worker
//! owns this state tree and the caller must bow out.

use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::io::Write;
use std::path::{Path, PathBuf};

/// True if `pid` names a live process we can see.
///
/// A permission error still means "alive, owned by someone else".
pub fn process_alive(pid: i32) -> bool {
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Outcome of a lock attempt.
#[derive(Debug)]
pub enum PidLock {
    /// We hold the lock; dropping the guard removes the file.
    Acquired(PidLockGuard),
    /// Another live worker (with this PID) already holds it.
    AlreadyRunning { pid: i32 },
}

impl PidLock {
    /// Try to take the lock for the current process.
    pub fn acquire(path: &Path) -> std::io::Result<PidLock> {
        if let Some(existing) = read_pid(path) {
            let own = std::process::id() as i32;
            if existing != own && process_alive(existing) {
                return Ok(PidLock::AlreadyRunning { pid: existing });
            }
        }

        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(PidLock::Acquired(PidLockGuard { path: path.to_path_buf() }))
    }
}

/// PID recorded in the lock file, if readable.
pub fn read_pid(path: &Path) -> Option<i32> {
    let body = std::fs::read_to_string(path).ok()?;
    body.trim().parse().ok()
}

/// Held lock; removes the PID file on drop.
#[derive(Debug)]
pub struct PidLockGuard {
    path: PathBuf,
}

impl PidLockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidLockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "pid_lock_tests.rs"]
mod tests;
