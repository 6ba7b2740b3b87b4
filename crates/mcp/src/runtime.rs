// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! In-memory handle for one active MCP server (spec §3 `MCPRuntime`). Owned
//! by the supervisor; one instance per running server, stdio or remote.

use crate::correlation::PendingRequests;
use clara_core::McpRuntimeStatus;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::process::{Child, ChildStdin};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Error)]
pub enum McpRuntimeError {
    #[error("mcp server {0} is not registered")]
    NotRegistered(String),

    #[error("mcp server {0} is not running")]
    NotRunning(String),

    #[error("command {0:?} for mcp server {1} was not found on PATH")]
    CommandNotFound(String, String),

    #[error("failed to spawn mcp server {0}: {1}")]
    SpawnFailed(String, String),

    #[error("io error talking to mcp server {0}: {1}")]
    Io(String, String),

    #[error("mcp server {0} has no url configured for a remote tool call")]
    MissingUrl(String),

    #[error("mcp call to {0} timed out after {1:?}")]
    Timeout(String, Duration),

    #[error("mcp server {0} returned an error: {1}")]
    ServerError(String, String),

    #[error("http error calling remote mcp server {0}: {1}")]
    Http(String, String),
}

pub(crate) enum Transport {
    Stdio { child: AsyncMutex<Option<Child>>, stdin: AsyncMutex<Option<ChildStdin>>, pid: u32 },
    Remote { url: String, headers: HashMap<String, String> },
}

/// One active MCP server. `status`/`started_at_ms` mirror spec §3's
/// `MCPRuntime`; `pending` is the JSON-RPC correlation table for stdio
/// servers (unused, but harmlessly present, for remote ones).
pub struct McpRuntime {
    pub(crate) transport: Transport,
    pub(crate) pending: PendingRequests,
    status: Mutex<McpRuntimeStatus>,
    pub started_at_ms: u64,
}

impl McpRuntime {
    pub(crate) fn new_stdio(child: Child, stdin: ChildStdin, pid: u32, started_at_ms: u64) -> Self {
        Self {
            transport: Transport::Stdio {
                child: AsyncMutex::new(Some(child)),
                stdin: AsyncMutex::new(Some(stdin)),
                pid,
            },
            pending: PendingRequests::new(),
            status: Mutex::new(McpRuntimeStatus::Starting),
            started_at_ms,
        }
    }

    pub(crate) fn new_remote(url: String, headers: HashMap<String, String>, started_at_ms: u64) -> Self {
        Self {
            transport: Transport::Remote { url, headers },
            pending: PendingRequests::new(),
            status: Mutex::new(McpRuntimeStatus::Starting),
            started_at_ms,
        }
    }

    pub fn status(&self) -> McpRuntimeStatus {
        *self.status.lock()
    }

    pub(crate) fn set_status(&self, status: McpRuntimeStatus) {
        *self.status.lock() = status;
    }

    pub fn pid(&self) -> Option<u32> {
        match &self.transport {
            Transport::Stdio { pid, .. } => Some(*pid),
            Transport::Remote { .. } => None,
        }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self.transport, Transport::Stdio { .. })
    }
}
