// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sichter-worker`: single queue-draining worker process.
//!
//! At most one worker runs per state tree, enforced by the PID lock. A
//! second start while the first is live logs a line and exits 0.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sichter_core::{Clock, StateTree, SystemClock, DEFAULT_ORG};
use sichter_storage::{EventLog, JobQueue, PidLock, PolicyStore};
use sichter_worker::{
    DirectoryWatcher, GitPublisher, JobProcessor, NotifyWatcher, Supervisor,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sichter-worker", about = "Sichter queue worker")]
struct Args {
    /// State-tree root (overrides the XDG convention).
    #[arg(long, env = "SICHTER_STATE_HOME")]
    state_dir: Option<PathBuf>,

    /// Config directory holding policy.yml.
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Base directory for local repository clones.
    #[arg(long, env = "SICHTER_REPOS_BASE")]
    repos_base: Option<PathBuf>,

    /// Org to enumerate when the policy does not name one.
    #[arg(long, env = "SICHTER_ORG")]
    org: Option<String>,

    /// Drain the current queue, then exit instead of waiting for changes.
    #[arg(long)]
    once: bool,
}

fn resolve_tree(args: &Args) -> StateTree {
    match (&args.state_dir, &args.config_dir) {
        (Some(state), Some(config)) => StateTree::at(state, config),
        (Some(state), None) => StateTree::at(state, StateTree::resolve().config_dir()),
        (None, Some(config)) => StateTree::at(StateTree::resolve().state_dir(), config),
        (None, None) => StateTree::resolve(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let tree = resolve_tree(&args);
    tree.ensure()?;

    // Per-run log file next to stdout logging; this is what the API serves
    // under /logs/latest.
    let clock = SystemClock;
    let stamp = clock.now_utc().format("%Y%m%d-%H%M%S");
    let appender =
        tracing_appender::rolling::never(tree.logs_dir(), format!("worker-{stamp}.log"));
    let (file_writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    // At-most-one worker per state tree.
    let _lock = match PidLock::acquire(&tree.pid_path())? {
        PidLock::AlreadyRunning { pid } => {
            tracing::info!(pid, "worker already active, exiting");
            return Ok(());
        }
        PidLock::Acquired(guard) => guard,
    };

    let policy_store = PolicyStore::new(tree.policy_path());
    let policy = policy_store.load();

    // Org precedence: explicit policy value, then flag/env, then default.
    let policy_names_org = policy_store
        .read_raw()
        .ok()
        .and_then(|raw| raw.get("org").map(|_| ()))
        .is_some();
    let org = if policy_names_org {
        policy.org.clone()
    } else {
        args.org.clone().unwrap_or_else(|| DEFAULT_ORG.to_string())
    };

    let home_repos = dirs::home_dir().map(|h| h.join("repos"));
    let repos_base = args
        .repos_base
        .clone()
        .or(home_repos)
        .unwrap_or_else(|| tree.state_dir().join("repos"));

    let events = EventLog::new(tree.events_dir());
    let queue = JobQueue::new(tree.queue_dir());
    let publisher = GitPublisher::new(repos_base);
    let processor =
        Arc::new(JobProcessor::new(policy, org, publisher, events.clone(), clock.clone()));
    let watcher: Arc<dyn DirectoryWatcher> = Arc::new(NotifyWatcher);
    let post_hook = tree.config_dir().join("hooks/post-run");

    let supervisor = Supervisor::new(
        queue,
        events,
        processor,
        watcher,
        Some(post_hook),
        clock,
    );

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    supervisor.run(shutdown, args.once).await;
    Ok(())
}

fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(term) => term,
            Err(err) => {
                tracing::warn!(%err, "failed to install SIGTERM handler");
                let _ = ctrl_c.await;
                shutdown.cancel();
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
        tracing::info!("shutdown signal received");
        shutdown.cancel();
    });
}
