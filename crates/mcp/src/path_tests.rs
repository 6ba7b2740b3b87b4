// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[test]
fn enhanced_path_appends_well_known_dirs_without_duplicating_existing() {
    let enhanced = enhanced_path(Some("/usr/local/bin:/usr/bin"));
    let entries: Vec<&str> = enhanced.split(':').collect();
    assert_eq!(entries.iter().filter(|e| **e == "/usr/local/bin").count(), 1);
    assert!(entries.contains(&"/usr/bin"));
}

#[test]
fn enhanced_path_handles_missing_existing_path() {
    let enhanced = enhanced_path(None);
    assert!(enhanced.contains("/usr/local/bin"));
}

#[test]
fn resolve_command_finds_binary_on_path() {
    let dir = std::env::temp_dir().join(format!("clara-mcp-path-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let bin = dir.join("my-mcp-tool");
    std::fs::write(&bin, "#!/bin/sh\n").unwrap();
    let path = format!("{}:/nonexistent", dir.display());

    let resolved = resolve_command("my-mcp-tool", &path);
    assert_eq!(resolved, Some(bin));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn resolve_command_returns_none_when_absent() {
    assert_eq!(resolve_command("definitely-not-a-real-mcp-binary", "/usr/bin:/bin"), None);
}
