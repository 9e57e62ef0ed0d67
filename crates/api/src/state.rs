// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared per-process state handed to every handler.

use std::sync::Arc;

use sichter_core::{StateTree, SystemClock};
use sichter_storage::{EventLog, JobQueue, PolicyStore};

use crate::config::{ApiConfig, RATE_LIMIT_WINDOW};
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub tree: StateTree,
    pub events: EventLog,
    pub queue: JobQueue,
    pub policy: PolicyStore,
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<ApiConfig>,
    pub clock: SystemClock,
}

impl AppState {
    pub fn new(tree: StateTree, config: ApiConfig) -> Self {
        let events = EventLog::new(tree.events_dir());
        let queue = JobQueue::new(tree.queue_dir());
        let policy = PolicyStore::new(tree.policy_path());
        let limiter = Arc::new(RateLimiter::new(RATE_LIMIT_WINDOW, config.rate_limit_max));
        Self {
            tree,
            events,
            queue,
            policy,
            limiter,
            config: Arc::new(config),
            clock: SystemClock,
        }
    }
}
