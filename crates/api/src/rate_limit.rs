// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-client sliding-window rate limiting.

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::error::ApiError;
use crate::state::AppState;

/// How many checks between full sweeps that drop empty buckets, so spurious
/// one-shot clients cannot grow the map without bound.
const EVICT_EVERY: u64 = 256;

#[derive(Debug, Default)]
struct Buckets {
    map: HashMap<String, VecDeque<Instant>>,
    ops: u64,
}

/// Process-wide request counter per client identifier.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    buckets: Mutex<Buckets>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self { window, max_requests, buckets: Mutex::new(Buckets::default()) }
    }

    /// Record a request and decide. Appends `now`, trims entries older than
    /// the window, rejects when the remaining count exceeds the ceiling.
    pub fn check(&self, client: &str) -> Result<(), ApiError> {
        self.check_at(Instant::now(), client)
    }

    pub fn check_at(&self, now: Instant, client: &str) -> Result<(), ApiError> {
        let mut buckets = self.buckets.lock();
        buckets.ops = buckets.ops.wrapping_add(1);
        if buckets.ops % EVICT_EVERY == 0 {
            let window = self.window;
            buckets.map.retain(|_, bucket| {
                trim(bucket, now, window);
                !bucket.is_empty()
            });
        }

        let bucket = buckets.map.entry(client.to_string()).or_default();
        bucket.push_back(now);
        trim(bucket, now, self.window);

        if bucket.len() > self.max_requests {
            return Err(ApiError::RateLimited);
        }
        Ok(())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().map.len()
    }
}

fn trim(bucket: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(front) = bucket.front() {
        if now.duration_since(*front) > window {
            bucket.pop_front();
        } else {
            break;
        }
    }
}

/// Middleware applying the limiter to every request it wraps. The client
/// identifier is the remote host, or `"unknown"` when the connection info
/// is unavailable.
pub async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    state.limiter.check(&client)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
