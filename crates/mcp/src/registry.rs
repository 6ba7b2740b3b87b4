// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Read/write seam for the persisted MCP server registry (spec §4.G, §4.I
//! `mcp_config.json`). Mirrors the pattern `clara-images::PullTimestampStore`
//! uses: this crate only needs the load/save contract, the real file-backed
//! implementation lives in `clara-storage` and is wired in by `clara-daemon`.

use async_trait::async_trait;
use clara_core::{McpServerDef, McpServerName};

#[async_trait]
pub trait McpRegistryStore: Send + Sync {
    async fn load(&self) -> (Vec<McpServerDef>, Vec<McpServerName>);
    async fn save(&self, servers: &[McpServerDef], last_running: &[McpServerName]);
}

#[cfg(feature = "test-support")]
pub struct FakeMcpRegistryStore {
    state: parking_lot::Mutex<(Vec<McpServerDef>, Vec<McpServerName>)>,
}

#[cfg(feature = "test-support")]
impl FakeMcpRegistryStore {
    pub fn new(servers: Vec<McpServerDef>, last_running: Vec<McpServerName>) -> Self {
        Self { state: parking_lot::Mutex::new((servers, last_running)) }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn saved_snapshot(&self) -> (Vec<McpServerDef>, Vec<McpServerName>) {
        self.state.lock().clone()
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl McpRegistryStore for FakeMcpRegistryStore {
    async fn load(&self) -> (Vec<McpServerDef>, Vec<McpServerName>) {
        self.state.lock().clone()
    }

    async fn save(&self, servers: &[McpServerDef], last_running: &[McpServerName]) {
        *self.state.lock() = (servers.to_vec(), last_running.to_vec());
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
