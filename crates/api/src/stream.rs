// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live event stream over WebSocket.
//!
//! After an initial replay of the newest day file, the handler tails the
//! log with a `(path, inode, offset)` cursor: rotation or truncation resets
//! the cursor to byte 0 of the current file, so no byte is delivered twice.
//! Every file read runs on the blocking pool; the connection task itself
//! only sleeps, selects, and sends.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use serde_json::json;
use sichter_core::Clock;
use sichter_storage::tail::{tail_lines, FileCursor};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::state::AppState;

const DEFAULT_REPLAY: usize = 50;
const DEFAULT_HEARTBEAT_SECS: u64 = 15;
const MIN_HEARTBEAT_SECS: u64 = 3;
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// `GET /events/stream`: upgrade and hand off to the tail loop.
///
/// `replay` (default 50, explicit 0 means none) and `heartbeat` (seconds,
/// default 15, floor 3) are parsed leniently: garbage falls back to the
/// default rather than failing the upgrade.
pub async fn stream(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Response {
    let replay =
        params.get("replay").and_then(|v| v.parse::<usize>().ok()).unwrap_or(DEFAULT_REPLAY);
    let heartbeat = params
        .get("heartbeat")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_HEARTBEAT_SECS)
        .max(MIN_HEARTBEAT_SECS);

    ws.on_upgrade(move |socket| run(socket, state, replay, Duration::from_secs(heartbeat)))
}

async fn run(mut socket: WebSocket, state: AppState, replay: usize, heartbeat: Duration) {
    let log = state.events.clone();

    // Replay the tail of the newest file, then continue from its end. Lines
    // appended between the tail read and the stat are skipped, never
    // duplicated.
    let mut cursor: Option<FileCursor> = None;
    if let Some(newest) = log.newest_file() {
        if replay > 0 {
            let path = newest.clone();
            let lines = tokio::task::spawn_blocking(move || tail_lines(&path, replay)).await;
            if let Ok(Ok(lines)) = lines {
                for line in lines {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if socket.send(Message::Text(line.into())).await.is_err() {
                        return;
                    }
                }
            }
        }
        cursor = FileCursor::end_of(&newest).ok();
    }

    let mut pending = String::new();
    let mut last_traffic = Instant::now();

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    None | Some(Ok(Message::Close(_))) | Some(Err(_)) => return,
                    Some(Ok(_)) => continue,
                }
            }
            () = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        let scan_log = log.clone();
        let newest = match tokio::task::spawn_blocking(move || scan_log.newest_file()).await {
            Ok(newest) => newest,
            Err(_join) => continue,
        };

        let Some(newest) = newest else {
            if !heartbeat_if_due(&mut socket, &state, heartbeat, &mut last_traffic).await {
                return;
            }
            continue;
        };

        if cursor.as_ref().map(|c| c.path() != newest).unwrap_or(true) {
            cursor = Some(FileCursor::start_of(&newest));
            pending.clear();
        }

        if let Some(current) = cursor.take() {
            let (current, chunk) = read_chunk(current).await;
            cursor = Some(current);
            match chunk {
                Ok(chunk) if !chunk.is_empty() => {
                    pending.push_str(&chunk);
                    if !drain_lines(&mut socket, &mut pending, &mut last_traffic).await {
                        return;
                    }
                }
                Ok(_) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    // Rotated or not yet visible; next tick re-resolves.
                }
                Err(err) => {
                    tracing::debug!(path = %newest.display(), %err, "transient stream read error");
                    if !send_error_line(&mut socket, &state, &err, &newest).await {
                        return;
                    }
                }
            }
        }

        if !heartbeat_if_due(&mut socket, &state, heartbeat, &mut last_traffic).await {
            return;
        }
    }
}

/// Move the cursor onto the blocking pool for one read, then hand it back.
async fn read_chunk(mut cursor: FileCursor) -> (FileCursor, std::io::Result<String>) {
    match tokio::task::spawn_blocking(move || {
        let chunk = cursor.read_new();
        (cursor, chunk)
    })
    .await
    {
        Ok((cursor, chunk)) => (cursor, chunk),
        Err(join) => {
            // The cursor is lost with the panicked task; restart from zero
            // next tick via a fresh stat. This should not happen.
            (FileCursor::start_of(Path::new("")), Err(std::io::Error::other(join)))
        }
    }
}

/// Send every complete line buffered in `pending`. Returns false when the
/// client is gone.
async fn drain_lines(socket: &mut WebSocket, pending: &mut String, last_traffic: &mut Instant) -> bool {
    while let Some(pos) = pending.find('\n') {
        let line: String = pending.drain(..=pos).collect();
        let line = line.trim_end_matches('\n');
        if line.trim().is_empty() {
            continue;
        }
        if socket.send(Message::Text(line.to_string().into())).await.is_err() {
            return false;
        }
        *last_traffic = Instant::now();
    }
    true
}

async fn heartbeat_if_due(
    socket: &mut WebSocket,
    state: &AppState,
    heartbeat: Duration,
    last_traffic: &mut Instant,
) -> bool {
    if last_traffic.elapsed() < heartbeat {
        return true;
    }
    let line = json!({ "ts": state.clock.now_utc().to_rfc3339(), "type": "heartbeat" }).to_string();
    if socket.send(Message::Text(line.into())).await.is_err() {
        return false;
    }
    *last_traffic = Instant::now();
    true
}

/// Report an in-loop error to the client before retrying.
async fn send_error_line(
    socket: &mut WebSocket,
    state: &AppState,
    err: &std::io::Error,
    path: &Path,
) -> bool {
    let line = json!({
        "ts": state.clock.now_utc().to_rfc3339(),
        "type": "error",
        "detail": format!("{}: {err}", path.display()),
    })
    .to_string();
    socket.send(Message::Text(line.into())).await.is_ok()
}
