// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Top-level `PlatformProbe`: detects the host, runs the three gates, and
//! derives the feature-gate map (spec §4.A).

use crate::cache::SystemConfigCache;
use crate::gates::{binary_gate, os_gate, resource_gate};
use clara_core::{
    Arch, BinaryGateResult, Clock, FeatureGateMap, Os, OsGateResult, OsVersion, PerformanceMode,
    PlatformCapabilities, ResourceGateResult, ResourceThresholds,
};
use std::collections::HashMap;
use std::path::PathBuf;
use sysinfo::{Disks, System};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read OS version: {0}")]
    OsVersionUnavailable(String),
    #[error("failed to persist platform cache: {0}")]
    CachePersistFailed(String),
}

/// Combined result of a probe run: the capabilities plus the individual
/// gate outcomes (the GUI's guided dialog needs the OS gate's
/// recommendations and upgrade instructions independently of the coarse
/// performance mode).
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub capabilities: PlatformCapabilities,
    pub os_gate: OsGateResult,
    pub resource_gate: ResourceGateResult,
    pub binary_gate: BinaryGateResult,
}

pub struct PlatformProbe<C: Clock> {
    clock: C,
    cache: SystemConfigCache,
    thresholds: ResourceThresholds,
    platform_dir: PathBuf,
    expected_binary_files: Vec<&'static str>,
}

impl<C: Clock> PlatformProbe<C> {
    pub fn new(clock: C, config_dir: PathBuf, platform_dir: PathBuf) -> Self {
        Self {
            clock,
            cache: SystemConfigCache::new(config_dir.join("clara-system-config.yaml")),
            thresholds: ResourceThresholds::default(),
            platform_dir,
            expected_binary_files: default_expected_binary_files(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ResourceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Runs (or replays the cache for) a platform probe.
    ///
    /// Re-evaluation is skipped if the cache is younger than
    /// `CACHE_TTL_MS` unless `force` is set.
    pub fn probe(&self, force: bool) -> Result<ProbeOutcome, ProbeError> {
        if !force {
            if let Some(cached) = self.cache.load_if_fresh(self.clock.epoch_ms()) {
                return Ok(cached);
            }
        }

        let os = Os::current();
        let arch = Arch::current();
        let os_version = detect_os_version(os).map_err(ProbeError::OsVersionUnavailable)?;

        let (ram_gb, cores, free_disk_gb) = measure_resources();

        let resource = resource_gate(ram_gb, cores, free_disk_gb, &self.thresholds);
        let os_result = os_gate(os, os_version);
        let binary_result = binary_gate(&self.platform_dir, &self.expected_binary_files);

        let performance_mode = resource.performance_mode();
        let feature_gate = derive_feature_gate(performance_mode);

        let capabilities = PlatformCapabilities {
            os,
            arch,
            os_version,
            kernel_or_build: None,
            ram_gb,
            cores,
            free_disk_gb,
            performance_mode,
            feature_gate,
        };

        let outcome = ProbeOutcome {
            capabilities,
            os_gate: os_result,
            resource_gate: resource,
            binary_gate: binary_result,
        };

        self.cache
            .save(&outcome, self.clock.epoch_ms())
            .map_err(|e| ProbeError::CachePersistFailed(e.to_string()))?;

        Ok(outcome)
    }
}

/// Derives the feature-gate map from the performance mode (spec §4.A:
/// "comfyui forced off in core-only; containerized services forced off in
/// core-only").
fn derive_feature_gate(mode: PerformanceMode) -> FeatureGateMap {
    let mut map = HashMap::new();
    match mode {
        PerformanceMode::Full => {
            map.insert("comfyui".to_string(), true);
            map.insert("n8n".to_string(), true);
            map.insert("rag_and_tts".to_string(), true);
            map.insert("clara_core".to_string(), true);
        }
        PerformanceMode::Lite => {
            map.insert("comfyui".to_string(), false);
            map.insert("n8n".to_string(), true);
            map.insert("rag_and_tts".to_string(), true);
            map.insert("clara_core".to_string(), true);
        }
        PerformanceMode::CoreOnly => {
            map.insert("comfyui".to_string(), false);
            map.insert("n8n".to_string(), false);
            map.insert("rag_and_tts".to_string(), false);
            map.insert("clara_core".to_string(), true);
        }
    }
    FeatureGateMap(map)
}

fn measure_resources() -> (f64, u32, f64) {
    let mut sys = System::new_all();
    sys.refresh_memory();
    sys.refresh_cpu_all();

    let ram_gb = sys.total_memory() as f64 / (1024.0 * 1024.0 * 1024.0);
    let cores = sys.cpus().len().max(1) as u32;

    let disks = Disks::new_with_refreshed_list();
    let free_disk_gb = disks
        .list()
        .iter()
        .map(|d| d.available_space() as f64)
        .fold(0.0, f64::max)
        / (1024.0 * 1024.0 * 1024.0);

    (ram_gb, cores, free_disk_gb)
}

/// Platform-specific OS version detection. Real implementations read
/// `/etc/os-release` (Linux), `sw_vers` (macOS), or `cmd /c ver` /
/// `GetVersionEx`-equivalent registry keys (Windows); here we fall back to
/// `sysinfo`'s OS version string parsed into a triple.
fn detect_os_version(_os: Os) -> Result<OsVersion, String> {
    let raw = System::os_version().unwrap_or_default();
    Ok(parse_os_version(&raw))
}

fn parse_os_version(raw: &str) -> OsVersion {
    let mut parts = raw.split(['.', '-', ' ']).filter_map(|p| p.parse::<u32>().ok());
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);
    OsVersion::new(major, minor, patch)
}

fn default_expected_binary_files() -> Vec<&'static str> {
    if cfg!(target_os = "windows") {
        vec!["llama-server.exe"]
    } else {
        vec!["llama-server"]
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
