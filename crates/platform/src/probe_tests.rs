// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use clara_core::FakeClock;

#[test]
fn parse_os_version_extracts_leading_numeric_triple() {
    assert_eq!(parse_os_version("14.2.1"), OsVersion::new(14, 2, 1));
    assert_eq!(parse_os_version("10.0.22631"), OsVersion::new(10, 0, 22631));
}

#[test]
fn parse_os_version_defaults_missing_components_to_zero() {
    assert_eq!(parse_os_version("14"), OsVersion::new(14, 0, 0));
    assert_eq!(parse_os_version(""), OsVersion::new(0, 0, 0));
}

#[test]
fn feature_gate_forces_comfyui_and_containers_off_in_core_only() {
    let gate = derive_feature_gate(PerformanceMode::CoreOnly);
    assert!(!gate.enabled("comfyui"));
    assert!(!gate.enabled("n8n"));
    assert!(gate.enabled("clara_core"));
}

#[test]
fn feature_gate_enables_everything_in_full_mode() {
    let gate = derive_feature_gate(PerformanceMode::Full);
    assert!(gate.enabled("comfyui"));
    assert!(gate.enabled("n8n"));
    assert!(gate.enabled("rag_and_tts"));
}

#[test]
fn lite_mode_disables_only_comfyui() {
    let gate = derive_feature_gate(PerformanceMode::Lite);
    assert!(!gate.enabled("comfyui"));
    assert!(gate.enabled("n8n"));
}

#[test]
fn probe_persists_and_reuses_cache_within_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let probe =
        PlatformProbe::new(clock.clone(), dir.path().to_path_buf(), dir.path().join("bin"));

    let first = probe.probe(false).expect("initial probe succeeds");
    let second = probe.probe(false).expect("cached probe succeeds");
    assert_eq!(first.capabilities.cores, second.capabilities.cores);

    // Cache file exists and the second call did not error even though the
    // platform-binary dir doesn't exist (binary gate failure is advisory).
    assert!(dir.path().join("clara-system-config.yaml").is_file());
}

#[test]
fn probe_force_bypasses_fresh_cache() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let probe =
        PlatformProbe::new(clock.clone(), dir.path().to_path_buf(), dir.path().join("bin"));

    probe.probe(false).expect("initial probe succeeds");
    // Forced re-probe should not error even though nothing changed.
    probe.probe(true).expect("forced probe succeeds");
}
