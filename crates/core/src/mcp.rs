// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Data model for MCP server registry and runtime (spec §3, §4.G).

use crate::ids::McpServerName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpServerType {
    Stdio,
    Remote,
}

/// A user-defined MCP server registration. Persisted in `mcp_config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerDef {
    pub name: McpServerName,
    #[serde(rename = "type")]
    pub server_type: McpServerType,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    pub created_at_ms: u64,
    #[serde(default)]
    pub updated_at_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpRuntimeStatus {
    Starting,
    Running,
    Error,
    Stopped,
}

/// A pre-parameterized MCP server shape the GUI can use to seed new entries
/// (spec §4.G "Templates").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTemplate {
    pub id: String,
    pub label: String,
    pub server_type: McpServerType,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub url: Option<String>,
    pub description: String,
}

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod tests;
