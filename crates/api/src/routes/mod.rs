// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table and middleware assembly.

mod events;
mod health;
mod jobs;
mod overview;
mod policy;

use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use crate::state::AppState;
use crate::{gate, rate_limit, stream};

/// Build the full application router.
///
/// `/healthz` and `/readyz` are open; everything else (the stream included)
/// sits behind the rate limiter and the API-key gate, in that order.
pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/enqueue", post(jobs::enqueue))
        .route("/sweep", post(jobs::sweep))
        .route("/events/tail", get(events::tail))
        .route("/events/recent", get(events::recent))
        .route("/events/stream", get(stream::stream))
        .route("/logs/latest", get(events::logs_latest))
        .route("/policy", get(policy::read))
        .route("/policy", put(policy::write))
        .route("/overview", get(overview::overview))
        .layer(middleware::from_fn_with_state(state.clone(), gate::require_api_key))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::enforce));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .merge(gated)
        .layer(cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Cross-origin layer from configuration. Credentials are only allowed with
/// an explicit origin list; a configured `*` gets the credential-less
/// wildcard semantics the CORS spec permits.
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::None => CorsLayer::new(),
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin, "ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(values)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-api-key")])
                .allow_credentials(true)
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
