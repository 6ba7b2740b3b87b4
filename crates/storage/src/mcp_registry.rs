// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `mcp_config.json`: the persisted MCP server registry plus the
//! `last_running_servers` list used to resume on daemon restart (spec §4.G).

use crate::atomic::{load_json_tolerant, save_json_atomic};
use clara_core::{McpServerDef, McpServerName};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpRegistryDocument {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub servers: Vec<McpServerDef>,
    #[serde(default)]
    pub last_running_servers: Vec<McpServerName>,
}

pub struct McpRegistryFile {
    path: PathBuf,
}

impl McpRegistryFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> McpRegistryDocument {
        load_json_tolerant(&self.path)
    }

    pub fn save(&self, mut doc: McpRegistryDocument) {
        doc.schema_version = 1;
        if let Err(e) = save_json_atomic(&self.path, &doc) {
            warn!(error = %e, path = %self.path.display(), "failed to persist MCP registry");
        }
    }
}

#[cfg(test)]
#[path = "mcp_registry_tests.rs"]
mod tests;
