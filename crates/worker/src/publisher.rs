// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-control publication capability.
//!
//! The worker treats clone/branch/commit/push/PR as an opaque collaborator
//! behind this trait. The production implementation shells out to `git` and
//! `gh`; tests use the recording fake.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

pub const COMMIT_MESSAGE: &str = "sichter: autofix";
pub const PR_LABELS: [&str; 2] = ["sichter", "automation"];
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);
const MUTATION_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
    #[error("{command} timed out")]
    Timeout { command: String },
}

/// What the job pipeline needs from version control.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Make sure a working tree for `org/name` exists locally, cloning if
    /// needed. Returns the tree's root.
    async fn ensure_repo(&self, org: &str, name: &str) -> Result<PathBuf, PublishError>;

    /// Create a fresh work branch off the default remote branch.
    async fn fresh_branch(&self, dir: &Path, branch: &str) -> Result<(), PublishError>;

    /// Paths changed relative to the default remote branch.
    async fn changed_paths(&self, dir: &Path) -> Result<Vec<String>, PublishError>;

    /// Stage everything and commit when the tree differs from HEAD.
    /// Returns whether a commit was made.
    async fn commit_if_changes(&self, dir: &Path) -> Result<bool, PublishError>;

    /// Push the branch with lease-safe semantics.
    async fn push(&self, dir: &Path, branch: &str) -> Result<(), PublishError>;

    /// Create the PR if the branch has none yet; either way return its URL
    /// (possibly empty when the forge does not report one).
    async fn create_or_update_pr(
        &self,
        repo: &str,
        dir: &Path,
        branch: &str,
    ) -> Result<String, PublishError>;

    /// Enumerate the org's repositories as `org/name`.
    async fn list_org_repos(&self, org: &str) -> Result<Vec<String>, PublishError>;

    /// Locally-cloned repositories as `org/name`.
    fn list_local_repos(&self, org: &str) -> Vec<String>;
}

/// `git`/`gh` subprocess implementation rooted at a clone base directory.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    base_dir: PathBuf,
}

impl GitPublisher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        timeout: Duration,
    ) -> Result<Output, PublishError> {
        let command = format!("{program} {}", args.join(" "));
        let output = tokio::time::timeout(
            timeout,
            Command::new(program).args(args).current_dir(cwd).output(),
        )
        .await
        .map_err(|_| PublishError::Timeout { command: command.clone() })??;
        Ok(output)
    }

    /// Run and require success.
    async fn run_checked(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        timeout: Duration,
    ) -> Result<Output, PublishError> {
        let output = self.run(program, args, cwd, timeout).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(PublishError::CommandFailed {
                command: format!("{program} {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn default_branch(&self, dir: &Path) -> String {
        match self
            .run("git", &["symbolic-ref", "--short", "refs/remotes/origin/HEAD"], dir, QUERY_TIMEOUT)
            .await
        {
            Ok(output) if output.status.success() => {
                let raw = String::from_utf8_lossy(&output.stdout);
                raw.trim().strip_prefix("origin/").unwrap_or(raw.trim()).to_string()
            }
            _ => "main".to_string(),
        }
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn ensure_repo(&self, org: &str, name: &str) -> Result<PathBuf, PublishError> {
        let dir = self.base_dir.join(name);
        if dir.join(".git").exists() {
            return Ok(dir);
        }
        std::fs::create_dir_all(&self.base_dir)?;
        let spec = format!("{org}/{name}");
        let dir_arg = dir.display().to_string();
        self.run_checked("gh", &["repo", "clone", &spec, &dir_arg], &self.base_dir, MUTATION_TIMEOUT)
            .await?;
        Ok(dir)
    }

    async fn fresh_branch(&self, dir: &Path, branch: &str) -> Result<(), PublishError> {
        self.run_checked("git", &["fetch", "origin", "--prune", "--tags"], dir, MUTATION_TIMEOUT)
            .await?;
        let default = self.default_branch(dir).await;
        let detach_target = format!("origin/{default}");

        let switched =
            self.run("git", &["switch", "--detach", &detach_target], dir, QUERY_TIMEOUT).await?;
        if !switched.status.success() {
            self.run_checked("git", &["checkout", "--detach", &detach_target], dir, QUERY_TIMEOUT)
                .await?;
        }

        let created = self.run("git", &["switch", "-C", branch], dir, QUERY_TIMEOUT).await?;
        if !created.status.success() {
            self.run_checked("git", &["checkout", "-B", branch], dir, QUERY_TIMEOUT).await?;
        }
        Ok(())
    }

    async fn changed_paths(&self, dir: &Path) -> Result<Vec<String>, PublishError> {
        let default = self.default_branch(dir).await;
        let range = format!("origin/{default}");
        let output =
            self.run_checked("git", &["diff", "--name-only", &range], dir, QUERY_TIMEOUT).await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn commit_if_changes(&self, dir: &Path) -> Result<bool, PublishError> {
        self.run_checked("git", &["add", "-A"], dir, QUERY_TIMEOUT).await?;
        let staged = self.run("git", &["diff", "--cached", "--quiet"], dir, QUERY_TIMEOUT).await?;
        if staged.status.success() {
            return Ok(false);
        }
        self.run_checked("git", &["commit", "-m", COMMIT_MESSAGE], dir, QUERY_TIMEOUT).await?;
        Ok(true)
    }

    async fn push(&self, dir: &Path, branch: &str) -> Result<(), PublishError> {
        self.run_checked(
            "git",
            &["push", "--set-upstream", "origin", branch, "--force-with-lease"],
            dir,
            MUTATION_TIMEOUT,
        )
        .await?;
        Ok(())
    }

    async fn create_or_update_pr(
        &self,
        repo: &str,
        dir: &Path,
        branch: &str,
    ) -> Result<String, PublishError> {
        let view_args = ["pr", "view", branch, "--json", "url", "-q", ".url"];
        let viewed = self.run("gh", &view_args, dir, QUERY_TIMEOUT).await?;
        let existing = String::from_utf8_lossy(&viewed.stdout).trim().to_string();

        if !viewed.status.success() || existing.is_empty() {
            let default = self.default_branch(dir).await;
            let title = format!("Sichter: auto PR ({repo})");
            self.run_checked(
                "gh",
                &[
                    "pr", "create", "--base", &default, "--fill", "--title", &title, "--label",
                    PR_LABELS[0], "--label", PR_LABELS[1],
                ],
                dir,
                MUTATION_TIMEOUT,
            )
            .await?;
        }

        let viewed = self.run("gh", &view_args, dir, QUERY_TIMEOUT).await?;
        Ok(String::from_utf8_lossy(&viewed.stdout).trim().to_string())
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<String>, PublishError> {
        let output = self
            .run_checked(
                "gh",
                &["repo", "list", org, "--limit", "100", "--json", "name", "-q", ".[].name"],
                &self.base_dir,
                QUERY_TIMEOUT,
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|name| format!("{org}/{name}"))
            .collect())
    }

    fn list_local_repos(&self, org: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.base_dir) else {
            return Vec::new();
        };
        let mut repos: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().join(".git").exists())
            .map(|entry| format!("{org}/{}", entry.file_name().to_string_lossy()))
            .collect();
        repos.sort();
        repos
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePublisher;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Scripted in-memory publisher that records every call.
    #[derive(Debug, Clone, Default)]
    pub struct FakePublisher {
        inner: Arc<Mutex<FakeState>>,
    }

    #[derive(Debug, Default)]
    struct FakeState {
        repos: HashMap<String, PathBuf>,
        org_repos: Vec<String>,
        changed: Vec<String>,
        has_changes: bool,
        clone_fails: bool,
        list_fails: bool,
        push_fails: bool,
        pr_fails: bool,
        pr_url: String,
        calls: Vec<String>,
    }

    impl FakePublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_repo(self, repo: &str, dir: impl Into<PathBuf>) -> Self {
            self.inner.lock().repos.insert(repo.to_string(), dir.into());
            self
        }

        pub fn with_org_repos(self, repos: &[&str]) -> Self {
            self.inner.lock().org_repos = repos.iter().map(|r| r.to_string()).collect();
            self
        }

        pub fn with_changed_paths(self, paths: &[&str]) -> Self {
            self.inner.lock().changed = paths.iter().map(|p| p.to_string()).collect();
            self
        }

        pub fn with_changes(self, has_changes: bool) -> Self {
            self.inner.lock().has_changes = has_changes;
            self
        }

        pub fn with_pr_url(self, url: &str) -> Self {
            self.inner.lock().pr_url = url.to_string();
            self
        }

        pub fn failing_clone(self) -> Self {
            self.inner.lock().clone_fails = true;
            self
        }

        pub fn failing_list(self) -> Self {
            self.inner.lock().list_fails = true;
            self
        }

        pub fn failing_push(self) -> Self {
            self.inner.lock().push_fails = true;
            self
        }

        pub fn failing_pr(self) -> Self {
            self.inner.lock().pr_fails = true;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.inner.lock().calls.clone()
        }

        fn record(&self, call: String) {
            self.inner.lock().calls.push(call);
        }

        fn fail(command: &str) -> PublishError {
            PublishError::CommandFailed {
                command: command.to_string(),
                stderr: "scripted failure".to_string(),
            }
        }
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        async fn ensure_repo(&self, org: &str, name: &str) -> Result<PathBuf, PublishError> {
            self.record(format!("ensure_repo {org}/{name}"));
            let state = self.inner.lock();
            if state.clone_fails {
                return Err(Self::fail("gh repo clone"));
            }
            state
                .repos
                .get(&format!("{org}/{name}"))
                .cloned()
                .ok_or_else(|| Self::fail("gh repo clone"))
        }

        async fn fresh_branch(&self, _dir: &Path, branch: &str) -> Result<(), PublishError> {
            self.record(format!("fresh_branch {branch}"));
            Ok(())
        }

        async fn changed_paths(&self, _dir: &Path) -> Result<Vec<String>, PublishError> {
            self.record("changed_paths".to_string());
            Ok(self.inner.lock().changed.clone())
        }

        async fn commit_if_changes(&self, _dir: &Path) -> Result<bool, PublishError> {
            self.record("commit_if_changes".to_string());
            Ok(self.inner.lock().has_changes)
        }

        async fn push(&self, _dir: &Path, branch: &str) -> Result<(), PublishError> {
            self.record(format!("push {branch}"));
            if self.inner.lock().push_fails {
                return Err(Self::fail("git push"));
            }
            Ok(())
        }

        async fn create_or_update_pr(
            &self,
            repo: &str,
            _dir: &Path,
            branch: &str,
        ) -> Result<String, PublishError> {
            self.record(format!("create_or_update_pr {repo} {branch}"));
            let state = self.inner.lock();
            if state.pr_fails {
                return Err(Self::fail("gh pr create"));
            }
            Ok(state.pr_url.clone())
        }

        async fn list_org_repos(&self, org: &str) -> Result<Vec<String>, PublishError> {
            self.record(format!("list_org_repos {org}"));
            let state = self.inner.lock();
            if state.list_fails {
                return Err(Self::fail("gh repo list"));
            }
            Ok(state.org_repos.clone())
        }

        fn list_local_repos(&self, org: &str) -> Vec<String> {
            self.record(format!("list_local_repos {org}"));
            let state = self.inner.lock();
            let mut repos: Vec<String> = state
                .repos
                .keys()
                .filter(|repo| repo.starts_with(&format!("{org}/")))
                .cloned()
                .collect();
            repos.sort();
            repos
        }
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
