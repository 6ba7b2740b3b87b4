// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use clara_core::{Arch, FeatureGateMap, Os, PerformanceMode};
use std::collections::HashMap;

fn sample_outcome() -> ProbeOutcome {
    ProbeOutcome {
        capabilities: PlatformCapabilities {
            os: Os::Linux,
            arch: Arch::Amd64,
            os_version: clara_core::OsVersion::new(6, 5, 0),
            kernel_or_build: None,
            ram_gb: 16.0,
            cores: 8,
            free_disk_gb: 100.0,
            performance_mode: PerformanceMode::Full,
            feature_gate: FeatureGateMap(HashMap::new()),
        },
        os_gate: OsGateResult {
            supported: true,
            warnings: vec![],
            recommendations: vec![],
            upgrade_instructions: None,
        },
        resource_gate: ResourceGateResult {
            ram_gb: 16.0,
            cores: 8,
            free_disk_gb: 100.0,
            all_minimums_met: true,
            all_recommended_met: true,
        },
        binary_gate: BinaryGateResult {
            platform_dir_exists: true,
            missing_files: vec![],
            non_executable_files: vec![],
        },
    }
}

#[test]
fn missing_cache_file_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SystemConfigCache::new(dir.path().join("clara-system-config.yaml"));
    assert!(cache.load_if_fresh(1_000).is_none());
}

#[test]
fn fresh_cache_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SystemConfigCache::new(dir.path().join("clara-system-config.yaml"));
    let outcome = sample_outcome();

    cache.save(&outcome, 1_000_000).unwrap();
    let loaded = cache.load_if_fresh(1_000_000 + 1_000).expect("should still be fresh");
    assert_eq!(loaded.capabilities.cores, 8);
}

#[test]
fn stale_cache_past_ttl_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SystemConfigCache::new(dir.path().join("clara-system-config.yaml"));
    let outcome = sample_outcome();

    cache.save(&outcome, 1_000_000).unwrap();
    let loaded = cache.load_if_fresh(1_000_000 + CACHE_TTL_MS);
    assert!(loaded.is_none());
}

#[test]
fn corrupt_cache_file_returns_none_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clara-system-config.yaml");
    std::fs::write(&path, "not: [valid, yaml for this schema").unwrap();
    let cache = SystemConfigCache::new(path);
    assert!(cache.load_if_fresh(1_000).is_none());
}
