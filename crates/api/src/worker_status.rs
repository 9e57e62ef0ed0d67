// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort worker status for the overview endpoint.
//!
//! The PID file is authoritative for liveness; `systemctl --user` adds
//! timestamps when the worker runs as a user service. The systemctl probe
//! is bounded and its absence is never an error.

use serde::Serialize;
use sichter_core::StateTree;
use sichter_storage::{process_alive, read_pid};
use std::collections::HashMap;
use std::time::Duration;
use tokio::process::Command;

const SERVICE_NAME: &str = "sichter-worker.service";
const SYSTEMCTL_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub active_state: String,
    pub sub_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_pid: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_exit: Option<String>,
}

pub async fn status(tree: &StateTree) -> WorkerStatus {
    let pid = read_pid(&tree.pid_path());
    let alive = pid.is_some_and(process_alive);

    let mut status = WorkerStatus {
        active_state: if alive { "active" } else { "inactive" }.to_string(),
        sub_state: "unknown".to_string(),
        main_pid: pid,
        since: None,
        last_exit: None,
    };

    if let Some(props) = systemctl_show(SERVICE_NAME).await {
        if let Some(active) = props.get("ActiveState") {
            status.active_state = active.clone();
        }
        if let Some(sub) = props.get("SubState") {
            status.sub_state = sub.clone();
        }
        if status.main_pid.is_none() {
            status.main_pid = props.get("MainPID").and_then(|p| p.parse().ok()).filter(|p| *p != 0);
        }
        // systemd timestamps are human-readable strings; pass them through.
        status.since = props
            .get("ActiveEnterTimestamp")
            .or_else(|| props.get("ExecMainStartTimestamp"))
            .filter(|v| !v.is_empty())
            .cloned();
        status.last_exit =
            props.get("InactiveExitTimestamp").filter(|v| !v.is_empty()).cloned();
    }

    status
}

async fn systemctl_show(service: &str) -> Option<HashMap<String, String>> {
    let output = tokio::time::timeout(
        SYSTEMCTL_TIMEOUT,
        Command::new("systemctl")
            .args([
                "--user",
                "show",
                service,
                "--property",
                "ActiveState,SubState,ExecMainStartTimestamp,ActiveEnterTimestamp,InactiveExitTimestamp,MainPID",
            ])
            .env("SYSTEMD_PAGER", "")
            .output(),
    )
    .await;

    let output = match output {
        Ok(Ok(output)) if output.status.success() => output,
        Ok(Ok(_)) | Ok(Err(_)) => return None,
        Err(_elapsed) => {
            tracing::debug!(service, "systemctl show timed out");
            return None;
        }
    };

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut props = HashMap::new();
    for line in raw.lines() {
        if let Some((key, value)) = line.split_once('=') {
            props.insert(key.to_string(), value.to_string());
        }
    }
    Some(props)
}
