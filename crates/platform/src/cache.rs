// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Timestamped YAML cache for platform probe results (spec §4.A, §4.I
//! `clara-system-config.yaml`).

use crate::probe::ProbeOutcome;
use clara_core::{BinaryGateResult, OsGateResult, PlatformCapabilities, ResourceGateResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Re-evaluation is skipped if the cache is younger than this, unless
/// `force=true` (spec §4.A).
pub const CACHE_TTL_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedDocument {
    #[serde(default)]
    schema_version: u32,
    cached_at_ms: u64,
    capabilities: PlatformCapabilities,
    os_gate: OsGateResult,
    resource_gate: ResourceGateResult,
    binary_gate: BinaryGateResult,
}

pub struct SystemConfigCache {
    path: PathBuf,
}

impl SystemConfigCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the cached outcome iff it parses and is younger than
    /// `CACHE_TTL_MS`. Tolerates a missing or corrupt file by returning
    /// `None` (the caller re-probes).
    pub fn load_if_fresh(&self, now_ms: u64) -> Option<ProbeOutcome> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let doc: CachedDocument = match serde_yaml::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "platform cache corrupt, re-probing");
                return None;
            }
        };

        if now_ms.saturating_sub(doc.cached_at_ms) >= CACHE_TTL_MS {
            return None;
        }

        Some(ProbeOutcome {
            capabilities: doc.capabilities,
            os_gate: doc.os_gate,
            resource_gate: doc.resource_gate,
            binary_gate: doc.binary_gate,
        })
    }

    /// Serializes fully into memory, then writes via a temp-file-plus-rename
    /// so no partially-valid file is ever observable (spec §4.I).
    pub fn save(&self, outcome: &ProbeOutcome, now_ms: u64) -> Result<(), std::io::Error> {
        let doc = CachedDocument {
            schema_version: 1,
            cached_at_ms: now_ms,
            capabilities: outcome.capabilities.clone(),
            os_gate: outcome.os_gate.clone(),
            resource_gate: outcome.resource_gate.clone(),
            binary_gate: outcome.binary_gate.clone(),
        };
        let serialized = serde_yaml::to_string(&doc)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("yaml.tmp");
        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(serialized.as_bytes())?;
        tmp_file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
