// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job pipeline: select repositories, analyze, publish.
//!
//! Per-repository failures are recoverable and become events; nothing in
//! here aborts the overall job. Only queue-level problems (a job document
//! that cannot even be read) bubble up to the supervisor.

use glob::Pattern;
use sichter_core::{dedupe_findings, Clock, Event, EventKind, Job, Policy, RunMode};
use sichter_storage::EventLog;
use std::path::{Path, PathBuf};

use crate::analyzer::{enabled_analyzers, FileSelection};
use crate::publisher::Publisher;
use crate::supervisor::JobHandler;

pub struct JobProcessor<P, C> {
    policy: Policy,
    org: String,
    publisher: P,
    events: EventLog,
    clock: C,
}

impl<P: Publisher, C: Clock> JobProcessor<P, C> {
    pub fn new(policy: Policy, org: String, publisher: P, events: EventLog, clock: C) -> Self {
        Self { policy, org, publisher, events, clock }
    }

    fn emit(&self, kind: EventKind) {
        let event = Event::new(&self.clock, kind);
        if let Err(err) = self.events.append(&event) {
            tracing::warn!(%err, "failed to append event");
        }
    }

    /// Job-level auto_pr wins when it is a real boolean; anything else
    /// defers to policy.
    fn resolve_auto_pr(&self, job: &Job) -> bool {
        job.auto_pr.unwrap_or(self.policy.auto_pr)
    }

    /// Which repositories this job covers, as `org/name`.
    async fn enumerate_repos(&self, job: &Job) -> Vec<String> {
        if let Some(repo) = &job.repo {
            return vec![repo.to_string()];
        }

        if job.mode.enumerates_remote() {
            match self.publisher.list_org_repos(&self.org).await {
                Ok(repos) => repos,
                Err(err) => {
                    tracing::warn!(%err, "org enumeration failed, falling back to local clones");
                    self.publisher.list_local_repos(&self.org)
                }
            }
        } else {
            self.publisher.list_local_repos(&self.org)
        }
    }

    fn exclude_patterns(&self) -> Vec<Pattern> {
        self.policy
            .excludes
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    tracing::warn!(pattern = raw, %err, "invalid exclude glob in policy, ignoring");
                    None
                }
            })
            .collect()
    }

    async fn select_files(&self, job: &Job, dir: &Path) -> FileSelection {
        let excludes = self.exclude_patterns();
        if job.mode != sichter_core::JobMode::Changed {
            return FileSelection::Whole { excludes };
        }

        match self.publisher.changed_paths(dir).await {
            Ok(raw) => FileSelection::Paths(filter_changed(dir, raw, &excludes)),
            Err(err) => {
                tracing::warn!(%err, "failed to list changed paths, analyzing whole tree");
                FileSelection::Whole { excludes }
            }
        }
    }

    async fn process_repo(&self, repo: &str, job: &Job, auto_pr: bool, run_mode: RunMode) {
        let (org, name) = repo.split_once('/').unwrap_or((self.org.as_str(), repo));

        let dir = match self.publisher.ensure_repo(org, name).await {
            Ok(dir) => dir,
            Err(err) => {
                tracing::warn!(repo, %err, "clone failed");
                self.emit(EventKind::CloneFailed { repo: repo.to_string(), error: err.to_string() });
                return;
            }
        };

        let branch =
            format!("sichter/autofix-{}", self.clock.now_utc().format("%Y%m%d-%H%M%S"));
        if let Err(err) = self.publisher.fresh_branch(&dir, &branch).await {
            tracing::warn!(repo, branch, %err, "failed to prepare work branch, skipping repo");
            return;
        }

        let selection = self.select_files(job, &dir).await;

        let mut findings = Vec::new();
        for analyzer in enabled_analyzers(&self.policy, run_mode) {
            if !analyzer.available().await {
                tracing::info!(analyzer = analyzer.name(), "tool not found, skipping");
                continue;
            }
            match analyzer.run(&dir, &selection).await {
                Ok(batch) => {
                    tracing::debug!(analyzer = analyzer.name(), count = batch.len(), "analyzer done");
                    findings.extend(batch);
                }
                Err(err) => {
                    tracing::warn!(analyzer = analyzer.name(), %err, "analyzer failed, continuing");
                }
            }
        }

        if !findings.is_empty() {
            let count = findings.len();
            let deduped = dedupe_findings(findings).len();
            self.emit(EventKind::Findings { repo: repo.to_string(), count, deduped });
        }

        match self.publisher.commit_if_changes(&dir).await {
            Ok(false) => {
                tracing::info!(repo, "no changes");
                self.emit(EventKind::Noop { repo: repo.to_string(), branch });
            }
            Ok(true) if !auto_pr => {
                tracing::info!(repo, "auto-PR disabled, changes stay local");
                self.emit(EventKind::Commit { repo: repo.to_string(), branch, auto_pr: false });
            }
            Ok(true) => {
                if let Err(err) = self.publisher.push(&dir, &branch).await {
                    self.emit(EventKind::PushFailed {
                        repo: repo.to_string(),
                        branch,
                        error: err.to_string(),
                    });
                    return;
                }
                match self.publisher.create_or_update_pr(repo, &dir, &branch).await {
                    Ok(url) => {
                        tracing::info!(repo, url, "pull request ready");
                        self.emit(EventKind::Pr { repo: repo.to_string(), branch, url });
                    }
                    Err(err) => {
                        self.emit(EventKind::PrFailed {
                            repo: repo.to_string(),
                            branch,
                            error: err.to_string(),
                        });
                    }
                }
            }
            Err(err) => {
                tracing::warn!(repo, %err, "commit check failed, skipping publication");
            }
        }
    }
}

#[async_trait::async_trait]
impl<P: Publisher, C: Clock> JobHandler for JobProcessor<P, C> {
    async fn handle(&self, job: &Job) {
        let auto_pr = self.resolve_auto_pr(job);
        let run_mode = job.mode.run_mode_override().unwrap_or(self.policy.run_mode);
        tracing::info!(
            job_id = %job.job_id, kind = %job.kind, mode = %job.mode, auto_pr, "job received"
        );

        for repo in self.enumerate_repos(job).await {
            self.process_repo(&repo, job, auto_pr, run_mode).await;
        }
    }
}

/// Keep only changed paths that still exist, resolve inside the repository
/// root, and match no exclude pattern.
fn filter_changed(dir: &Path, raw: Vec<String>, excludes: &[Pattern]) -> Vec<PathBuf> {
    let Ok(root) = dir.canonicalize() else {
        return Vec::new();
    };

    let mut selected = Vec::new();
    for rel in raw {
        if excludes.iter().any(|ex| ex.matches(&rel)) {
            continue;
        }
        let path = dir.join(&rel);
        if !path.exists() {
            continue;
        }
        match path.canonicalize() {
            Ok(real) if real.starts_with(&root) => selected.push(path),
            Ok(real) => {
                tracing::warn!(path = rel, real = %real.display(), "path escapes repository root, skipping");
            }
            Err(err) => {
                tracing::debug!(path = rel, %err, "cannot resolve changed path, skipping");
            }
        }
    }
    selected
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
