// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! PATH enhancement and command resolution for stdio MCP servers (spec §4.G
//! "validate command exists in PATH ... enhanced with well-known runtime
//! install locations before probe").

use std::path::PathBuf;

/// Directories package managers and runtime installers commonly drop
/// binaries into but that a GUI-launched process often doesn't inherit in
/// its environment `PATH` (unlike a shell login session).
fn well_known_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/usr/local/bin"), PathBuf::from("/opt/homebrew/bin")];
    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(".local/bin"));
        dirs.push(home.join(".cargo/bin"));
        dirs.push(home.join(".volta/bin"));
        dirs.push(home.join(".nvm/current/bin"));
        dirs.push(home.join(".bun/bin"));
    }
    dirs
}

/// Builds an enhanced `PATH` value by appending the well-known directories
/// that are not already present, preserving the existing entries' order.
pub fn enhanced_path(existing: Option<&str>) -> String {
    let mut entries: Vec<String> =
        existing.map(|p| p.split(':').map(str::to_string).collect()).unwrap_or_default();
    for dir in well_known_dirs() {
        let Some(dir) = dir.to_str() else { continue };
        if !entries.iter().any(|e| e == dir) {
            entries.push(dir.to_string());
        }
    }
    entries.join(":")
}

/// Resolves `command` against `path`, returning the absolute path if found.
/// Absolute/relative paths containing a separator are checked directly.
pub fn resolve_command(command: &str, path: &str) -> Option<PathBuf> {
    if command.contains('/') {
        let candidate = PathBuf::from(command);
        return candidate.is_file().then_some(candidate);
    }
    path.split(':').map(PathBuf::from).map(|dir| dir.join(command)).find(|p| p.is_file())
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
