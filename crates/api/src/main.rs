// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sichter-api`: HTTP/WS front end for the job queue and event log.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use sichter_api::config::{ApiConfig, CorsOrigins, DEFAULT_BIND, DEFAULT_RATE_LIMIT_MAX};
use sichter_api::{routes, AppState};
use sichter_core::StateTree;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sichter-api", about = "Sichter control-plane API")]
struct Args {
    /// Listen address.
    #[arg(long, env = "SICHTER_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Shared secret clients must present in X-API-Key. Without it the
    /// gate rejects all traffic.
    #[arg(long, env = "SICHTER_API_KEY")]
    api_key: Option<String>,

    /// Requests allowed per client per minute.
    #[arg(long, env = "SICHTER_RATE_LIMIT_MAX", default_value_t = DEFAULT_RATE_LIMIT_MAX)]
    rate_limit_max: usize,

    /// Comma-separated CORS origins; the literal `*` enables any origin.
    #[arg(long, env = "SICHTER_CORS_ORIGINS", default_value = "")]
    cors_origins: String,

    /// Additional origins for the review dashboards, merged into the CORS
    /// list.
    #[arg(long, env = "SICHTER_DASHBOARD_ORIGINS", default_value = "")]
    dashboard_origins: String,

    /// State-tree root (overrides the XDG convention).
    #[arg(long, env = "SICHTER_STATE_HOME")]
    state_dir: Option<PathBuf>,

    /// Config directory holding policy.yml.
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let tree = match (args.state_dir, args.config_dir) {
        (Some(state), Some(config)) => StateTree::at(state, config),
        (Some(state), None) => {
            let config = StateTree::resolve().config_dir().to_path_buf();
            StateTree::at(state, config)
        }
        (None, Some(config)) => {
            let state = StateTree::resolve().state_dir().to_path_buf();
            StateTree::at(state, config)
        }
        (None, None) => StateTree::resolve(),
    };
    tree.ensure()?;

    let origins = CorsOrigins::parse(&format!("{},{}", args.cors_origins, args.dashboard_origins));
    let config = ApiConfig::new(args.api_key, args.rate_limit_max, origins);
    if config.api_key.is_none() {
        tracing::warn!("no API key configured; every gated request will be rejected");
    }

    let state = AppState::new(tree, config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "sichter api listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(term) => term,
            Err(err) => {
                tracing::warn!(%err, "failed to install SIGTERM handler");
                let _ = ctrl_c.await;
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
