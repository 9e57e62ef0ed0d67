// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/WS control surface for the sichter fleet.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod gate;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod stream;
pub mod worker_status;

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;
