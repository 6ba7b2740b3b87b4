// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

fn template(id: &str, label: &str) -> McpTemplate {
    McpTemplate {
        id: id.to_string(),
        label: label.to_string(),
        server_type: McpServerType::Stdio,
        command: Some("x".to_string()),
        args: Vec::new(),
        url: None,
        description: String::new(),
    }
}

#[test]
fn build_templates_keeps_later_duplicate_and_reports_warning() {
    let raw = vec![template("filesystem", "first"), template("git", "git"), template("filesystem", "second")];
    let (templates, warnings) = build_templates(raw);

    let fs = templates.iter().find(|t| t.id == "filesystem").unwrap();
    assert_eq!(fs.label, "second");
    assert_eq!(templates.len(), 2);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("filesystem"));
}

#[test]
fn build_templates_no_warnings_when_ids_are_unique() {
    let raw = vec![template("a", "A"), template("b", "B")];
    let (templates, warnings) = build_templates(raw);
    assert_eq!(templates.len(), 2);
    assert!(warnings.is_empty());
}

#[test]
fn mcp_templates_catalog_has_no_duplicate_ids() {
    let templates = mcp_templates();
    let mut ids: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
    ids.sort_unstable();
    let mut deduped = ids.clone();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len());
    assert!(templates.iter().any(|t| t.id == "remote" && t.server_type == McpServerType::Remote));
}
