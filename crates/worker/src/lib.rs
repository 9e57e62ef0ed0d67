// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue-draining worker: supervises the durable queue and runs the
//! per-job inspection pipeline.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod analyzer;
pub mod processor;
pub mod publisher;
pub mod supervisor;
pub mod watcher;

pub use processor::JobProcessor;
pub use publisher::{GitPublisher, PublishError, Publisher};
pub use supervisor::{JobHandler, Supervisor};
pub use watcher::{DirectoryWatcher, NotifyWatcher, PollWatcher, WaitOutcome};
