// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The command/response surface the GUI drives (spec §6). Modeled as two
//! closed, tag-discriminated enums rather than per-call request/response
//! structs, transported as line-delimited JSON over a swappable channel
//! (Unix socket / named pipe) -- the transport itself is out of scope, same
//! as `spec.md`'s "IPC wire format to the GUI is an opaque event bus"
//! Non-goal. The event bus (`clara_core::Event`) is a second, independent
//! channel broadcast out-of-band from these request/response pairs.

use clara_core::{ClaraError, McpServerDef, McpServerName, McpServerType, McpTemplate, ServiceKey, ServiceStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Remove,
}

/// Partial update for `mcp.update` -- only present fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpServerPatch {
    pub server_type: Option<McpServerType>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub env: Option<HashMap<String, String>>,
    pub url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::large_enum_variant)]
pub enum Command {
    #[serde(rename = "engine.detect")]
    EngineDetect,
    #[serde(rename = "engine.report")]
    EngineReport,
    #[serde(rename = "engine.test_all")]
    EngineTestAll,

    #[serde(rename = "services.list")]
    ServicesList,
    #[serde(rename = "services.action")]
    ServicesAction { name: ServiceKey, action: ServiceAction },
    #[serde(rename = "services.logs")]
    ServicesLogs { name: ServiceKey, tail: usize },
    #[serde(rename = "services.stats")]
    ServicesStats { name: ServiceKey },

    #[serde(rename = "images.check_updates")]
    ImagesCheckUpdates,
    #[serde(rename = "images.update")]
    ImagesUpdate { names: Option<Vec<String>> },

    #[serde(rename = "llm.start")]
    LlmStart,
    #[serde(rename = "llm.stop")]
    LlmStop,
    #[serde(rename = "llm.restart")]
    LlmRestart,
    #[serde(rename = "llm.status")]
    LlmStatus,
    #[serde(rename = "llm.models")]
    LlmModels,
    #[serde(rename = "llm.regenerate_config")]
    LlmRegenerateConfig,

    #[serde(rename = "mcp.list")]
    McpList,
    #[serde(rename = "mcp.add")]
    McpAdd { def: McpServerDef },
    #[serde(rename = "mcp.remove")]
    McpRemove { name: McpServerName },
    #[serde(rename = "mcp.update")]
    McpUpdate { name: McpServerName, patch: McpServerPatch },
    #[serde(rename = "mcp.start")]
    McpStart { name: McpServerName },
    #[serde(rename = "mcp.stop")]
    McpStop { name: McpServerName },
    #[serde(rename = "mcp.restart")]
    McpRestart { name: McpServerName },
    #[serde(rename = "mcp.test")]
    McpTest { name: McpServerName },
    #[serde(rename = "mcp.templates")]
    McpTemplates,
    #[serde(rename = "mcp.start_all_enabled")]
    McpStartAllEnabled,
    #[serde(rename = "mcp.stop_all")]
    McpStopAll,
    #[serde(rename = "mcp.start_previously_running")]
    McpStartPreviouslyRunning,
    #[serde(rename = "mcp.save_running_state")]
    McpSaveRunningState,
    #[serde(rename = "mcp.execute_tool")]
    McpExecuteTool { name: McpServerName, tool_name: String, arguments: serde_json::Value },
    #[serde(rename = "mcp.diagnose_runtime")]
    McpDiagnoseRuntime { name: McpServerName },

    #[serde(rename = "native.check_updates")]
    NativeCheckUpdates,
    #[serde(rename = "native.update")]
    NativeUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub key: ServiceKey,
    pub status: ServiceStatus,
    pub last_check_at_ms: u64,
    pub consecutive_failures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpDiagnosis {
    pub name: McpServerName,
    pub registered: bool,
    pub running: bool,
    pub status: Option<String>,
}

/// Each `Ok` payload is scoped to the command that produced it so the GUI
/// doesn't need to guess shapes; `Error` carries the same rendered message
/// and dialog actions `ClaraError::user_message` already produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::large_enum_variant)]
pub enum Response {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "error")]
    Error { message: String },

    #[serde(rename = "engine.report")]
    EngineReport { endpoint: Option<String>, attempts: usize },

    #[serde(rename = "services.list")]
    ServicesList { services: Vec<ServiceSummary> },
    #[serde(rename = "services.logs")]
    ServicesLogs { lines: String },
    #[serde(rename = "services.stats")]
    ServicesStats { running: bool },

    #[serde(rename = "images.check_updates")]
    ImagesCheckUpdates { results: HashMap<String, String> },

    #[serde(rename = "llm.status")]
    LlmStatus { running: bool },
    #[serde(rename = "llm.models")]
    LlmModels { models: Vec<String> },

    #[serde(rename = "mcp.list")]
    McpList { servers: Vec<McpServerDef> },
    #[serde(rename = "mcp.templates")]
    McpTemplates { templates: Vec<McpTemplate> },
    #[serde(rename = "mcp.tool_result")]
    McpToolResult { result: serde_json::Value },
    #[serde(rename = "mcp.diagnose_runtime")]
    McpDiagnoseRuntime { diagnosis: McpDiagnosis },

    #[serde(rename = "native.check_updates")]
    NativeCheckUpdates { up_to_date: bool },
}

impl Response {
    pub fn from_error(error: &ClaraError) -> Self {
        Response::Error { message: error.user_message() }
    }
}
