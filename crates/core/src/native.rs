// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Data model for the native LLM-serving binary inventory (spec §3, §4.H).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// A single file tracked in the install directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifestEntry {
    pub file_name: String,
    /// Upstream files are eligible for replacement; custom files never are.
    pub origin: FileOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Official,
    Custom,
}

/// The installed-binary inventory for one platform directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeBinaryInventory {
    pub platform_dir: PathBuf,
    pub version: String,
    pub file_manifest: Vec<FileManifestEntry>,
    pub install_dir: PathBuf,
}

impl NativeBinaryInventory {
    pub fn official_files(&self) -> Vec<&str> {
        self.file_manifest
            .iter()
            .filter(|f| f.origin == FileOrigin::Official)
            .map(|f| f.file_name.as_str())
            .collect()
    }

    pub fn custom_files(&self) -> Vec<&str> {
        self.file_manifest
            .iter()
            .filter(|f| f.origin == FileOrigin::Custom)
            .map(|f| f.file_name.as_str())
            .collect()
    }
}

/// A named set of files a platform target requires/allows for replacement.
#[derive(Debug, Clone, Default)]
pub struct PlatformTargetSet {
    /// Must all be present in the extraction or the update aborts
    /// (`ValidationError::IncompleteUpdate`).
    pub essential: HashSet<String>,
    /// May be present; replaced if so.
    pub optional: HashSet<String>,
    /// Never replaced regardless of name overlap (custom files allowlist).
    pub never_replace: HashSet<String>,
}

#[cfg(test)]
#[path = "native_tests.rs"]
mod tests;
