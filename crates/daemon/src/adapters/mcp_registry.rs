// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Wires `clara_mcp::McpRegistryStore` to the file-backed
//! `clara_storage::McpRegistryFile` (spec §4.G, §4.I `mcp_config.json`).

use async_trait::async_trait;
use clara_core::{McpServerDef, McpServerName};
use clara_mcp::registry::McpRegistryStore;
use clara_storage::{McpRegistryDocument, McpRegistryFile};

pub struct FileMcpRegistryStore {
    file: McpRegistryFile,
}

impl FileMcpRegistryStore {
    pub fn new(path: std::path::PathBuf) -> Self {
        Self { file: McpRegistryFile::new(path) }
    }
}

#[async_trait]
impl McpRegistryStore for FileMcpRegistryStore {
    async fn load(&self) -> (Vec<McpServerDef>, Vec<McpServerName>) {
        let doc = self.file.load();
        (doc.servers, doc.last_running_servers)
    }

    async fn save(&self, servers: &[McpServerDef], last_running: &[McpServerName]) {
        self.file.save(McpRegistryDocument {
            schema_version: 1,
            servers: servers.to_vec(),
            last_running_servers: last_running.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clara_core::McpServerType;

    fn sample_def() -> McpServerDef {
        McpServerDef {
            name: McpServerName::from("filesystem"),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-filesystem".to_string()),
            args: Vec::new(),
            env: Default::default(),
            url: None,
            headers: Default::default(),
            description: String::new(),
            enabled: true,
            created_at_ms: 1_700_000_000_000,
            updated_at_ms: None,
        }
    }

    #[tokio::test]
    async fn round_trips_servers_and_last_running() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = FileMcpRegistryStore::new(dir.path().join("mcp_config.json"));

        let def = sample_def();
        let running = vec![def.name.clone()];
        store.save(&[def.clone()], &running).await;

        let (servers, last_running) = store.load().await;
        assert_eq!(servers, vec![def]);
        assert_eq!(last_running, running);
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = FileMcpRegistryStore::new(dir.path().join("does-not-exist.json"));
        let (servers, last_running) = store.load().await;
        assert!(servers.is_empty());
        assert!(last_running.is_empty());
    }
}
