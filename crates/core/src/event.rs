// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The orchestrator → GUI event bus (spec §6).
//!
//! The GUI is an opaque consumer; this enum is the entire contract. It is
//! broadcast over a `tokio::sync::broadcast` channel owned by `clara-daemon`
//! and is never matched on inside the orchestrator itself for control flow
//! (every component reacts to its own internal state, not to bus events).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    #[serde(rename = "setup.status")]
    SetupStatus { message: String, level: EventLevel, percentage: Option<f32> },

    #[serde(rename = "image.pull.progress")]
    ImagePullProgress { image_ref: String, status_text: String, percentage: f32 },

    #[serde(rename = "service.state")]
    ServiceState {
        key: String,
        status: String,
        last_check_at_ms: Option<u64>,
        consecutive_failures: u32,
    },

    #[serde(rename = "watchdog.notice")]
    WatchdogNotice { title: String, body: String, level: EventLevel },

    #[serde(rename = "mcp.server.state")]
    McpServerState {
        name: String,
        status: String,
        started_at_ms: Option<u64>,
        error: Option<String>,
        pid: Option<u32>,
    },

    #[serde(rename = "download.progress")]
    DownloadProgress { file_name: String, bytes: u64, total_bytes: Option<u64>, percentage: Option<f32> },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
