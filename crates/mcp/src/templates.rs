// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Static catalog of pre-parameterized `McpServerDef` shapes the GUI uses to
//! seed new entries (spec §4.G "Templates").

use clara_core::{McpServerType, McpTemplate};
use std::sync::OnceLock;
use tracing::warn;

fn raw_catalog() -> Vec<McpTemplate> {
    vec![
        McpTemplate {
            id: "filesystem".to_string(),
            label: "Filesystem".to_string(),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-filesystem".to_string()),
            args: vec!["--root".to_string(), ".".to_string()],
            url: None,
            description: "Read/write access to a local directory tree.".to_string(),
        },
        McpTemplate {
            id: "git".to_string(),
            label: "Git".to_string(),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-git".to_string()),
            args: Vec::new(),
            url: None,
            description: "Inspect and operate on a local git repository.".to_string(),
        },
        McpTemplate {
            id: "sqlite".to_string(),
            label: "SQLite".to_string(),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-sqlite".to_string()),
            args: Vec::new(),
            url: None,
            description: "Query a local SQLite database.".to_string(),
        },
        McpTemplate {
            id: "github".to_string(),
            label: "GitHub".to_string(),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-github".to_string()),
            args: Vec::new(),
            url: None,
            description: "Issues, PRs, and repository search via the GitHub API.".to_string(),
        },
        McpTemplate {
            id: "slack".to_string(),
            label: "Slack".to_string(),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-slack".to_string()),
            args: Vec::new(),
            url: None,
            description: "Read and post messages in Slack channels.".to_string(),
        },
        McpTemplate {
            id: "brave-search".to_string(),
            label: "Brave Search".to_string(),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-brave-search".to_string()),
            args: Vec::new(),
            url: None,
            description: "Web search via the Brave Search API.".to_string(),
        },
        McpTemplate {
            id: "memory".to_string(),
            label: "Memory".to_string(),
            server_type: McpServerType::Stdio,
            command: Some("mcp-server-memory".to_string()),
            args: Vec::new(),
            url: None,
            description: "Simple knowledge-graph scratchpad.".to_string(),
        },
        McpTemplate {
            id: "remote".to_string(),
            label: "Remote".to_string(),
            server_type: McpServerType::Remote,
            command: None,
            args: Vec::new(),
            url: Some(String::new()),
            description: "Any MCP server already exposed over HTTP.".to_string(),
        },
    ]
}

/// Merges a raw (possibly duplicate-bearing) template list into a catalog
/// keyed by id, keeping the later definition when a name repeats and
/// collecting a data-quality warning message for each collision.
pub fn build_templates(raw: Vec<McpTemplate>) -> (Vec<McpTemplate>, Vec<String>) {
    let mut by_id: indexmap::IndexMap<String, McpTemplate> = indexmap::IndexMap::new();
    let mut warnings = Vec::new();
    for template in raw {
        let id = template.id.clone();
        if by_id.insert(id.clone(), template).is_some() {
            warnings.push(format!("duplicate MCP template id {id:?}; using the later definition"));
        }
    }
    (by_id.into_values().collect(), warnings)
}

static CATALOG: OnceLock<Vec<McpTemplate>> = OnceLock::new();

/// The built-in template catalog, deduplicated and logged once at first use.
pub fn mcp_templates() -> &'static [McpTemplate] {
    CATALOG.get_or_init(|| {
        let (templates, warnings) = build_templates(raw_catalog());
        for warning in &warnings {
            warn!(warning, "data-quality warning building MCP template catalog");
        }
        templates
    })
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
