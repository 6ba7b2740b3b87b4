// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use clara_core::McpServerType;

fn sample_server(name: &str) -> McpServerDef {
    McpServerDef {
        name: McpServerName::from(name),
        server_type: McpServerType::Stdio,
        command: Some("npx".to_string()),
        args: vec!["-y".to_string(), "some-mcp-server".to_string()],
        env: Default::default(),
        url: None,
        headers: Default::default(),
        description: String::new(),
        enabled: true,
        created_at_ms: 1_000,
        updated_at_ms: None,
    }
}

#[test]
fn missing_file_loads_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let file = McpRegistryFile::new(dir.path().join("mcp_config.json"));
    let doc = file.load();
    assert!(doc.servers.is_empty());
    assert!(doc.last_running_servers.is_empty());
}

#[test]
fn registry_round_trips_with_last_running_servers() {
    let dir = tempfile::tempdir().unwrap();
    let file = McpRegistryFile::new(dir.path().join("mcp_config.json"));

    file.save(McpRegistryDocument {
        schema_version: 0,
        servers: vec![sample_server("filesystem")],
        last_running_servers: vec![McpServerName::from("filesystem")],
    });

    let reloaded = file.load();
    assert_eq!(reloaded.servers.len(), 1);
    assert_eq!(reloaded.last_running_servers, vec![McpServerName::from("filesystem")]);
    assert_eq!(reloaded.schema_version, 1);
}
