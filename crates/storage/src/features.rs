// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `clara-features.yaml`: the user's feature-enablement overrides layered on
//! top of the derived `FeatureGateMap` (spec §4.A, §8 testable property 8 —
//! unknown fields must round-trip rather than being dropped on save).

use crate::atomic::{load_yaml_tolerant, save_yaml_atomic};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturesDocument {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub overrides: HashMap<String, bool>,
    /// Fields this version of Clara doesn't understand are preserved
    /// verbatim across load/save instead of being silently dropped.
    #[serde(flatten)]
    pub extra: Map<String, serde_json::Value>,
}

pub struct FeaturesFile {
    path: PathBuf,
}

impl FeaturesFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> FeaturesDocument {
        load_yaml_tolerant(&self.path)
    }

    pub fn save(&self, mut doc: FeaturesDocument) {
        doc.schema_version = 1;
        if let Err(e) = save_yaml_atomic(&self.path, &doc) {
            warn!(error = %e, path = %self.path.display(), "failed to persist feature overrides");
        }
    }
}

#[cfg(test)]
#[path = "features_tests.rs"]
mod tests;
