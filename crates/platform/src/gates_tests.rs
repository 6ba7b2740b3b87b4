// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use std::fs;

#[test]
fn resource_gate_defaults_match_spec_thresholds() {
    let thresholds = ResourceThresholds::default();
    let gate = resource_gate(16.0, 8, 50.0, &thresholds);
    assert!(gate.all_minimums_met);
    assert!(gate.all_recommended_met);
}

#[test]
fn resource_gate_misses_recommended_disk_only() {
    let thresholds = ResourceThresholds::default();
    let gate = resource_gate(16.0, 8, 30.0, &thresholds);
    assert!(gate.all_minimums_met);
    assert!(!gate.all_recommended_met);
}

#[test]
fn os_gate_flags_unsupported_below_minimum() {
    let result = os_gate(Os::Windows, OsVersion::new(10, 0, 17763));
    assert!(!result.supported);
    assert!(result.upgrade_instructions.is_some());
    assert!(!result.warnings.is_empty());
}

#[test]
fn os_gate_recommends_upgrade_when_supported_but_below_recommended() {
    let result = os_gate(Os::Darwin, OsVersion::new(12, 5, 0));
    assert!(result.supported);
    assert!(result.upgrade_instructions.is_none());
    assert!(!result.recommendations.is_empty());
}

#[test]
fn os_gate_clean_when_at_or_above_recommended() {
    let result = os_gate(Os::Linux, OsVersion::new(6, 5, 0));
    assert!(result.supported);
    assert!(result.warnings.is_empty());
    assert!(result.recommendations.is_empty());
}

#[test]
fn binary_gate_fails_when_directory_missing() {
    let result = binary_gate(Path::new("/nonexistent/clara-binaries"), &["llama-server"]);
    assert!(!result.platform_dir_exists);
    assert_eq!(result.missing_files, vec!["llama-server".to_string()]);
}

#[test]
fn binary_gate_passes_when_files_present_and_executable() {
    let dir = tempfile::tempdir().unwrap();
    let bin_path = dir.path().join("llama-server");
    fs::write(&bin_path, b"#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&bin_path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let result = binary_gate(dir.path(), &["llama-server"]);
    assert!(result.passed());
}
