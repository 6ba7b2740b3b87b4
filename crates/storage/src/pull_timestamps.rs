// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `pull_timestamps.json`: per-image "last pulled at" records backing the
//! 10-day freshness throttle (spec §4.C, §4.I).

use crate::atomic::{load_json_tolerant, save_json_atomic};
use async_trait::async_trait;
use clara_images::PullTimestampStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    schema_version: u32,
    #[serde(default)]
    timestamps: HashMap<String, u64>,
}

pub struct PullTimestampFile {
    path: PathBuf,
    cache: Mutex<HashMap<String, u64>>,
}

impl PullTimestampFile {
    pub fn load(path: PathBuf) -> Self {
        let doc: Document = load_json_tolerant(&path);
        Self { path, cache: Mutex::new(doc.timestamps) }
    }

    fn persist(&self) {
        let doc = Document { schema_version: 1, timestamps: self.cache.lock().clone() };
        if let Err(e) = save_json_atomic(&self.path, &doc) {
            warn!(error = %e, path = %self.path.display(), "failed to persist pull timestamps");
        }
    }
}

#[async_trait]
impl PullTimestampStore for PullTimestampFile {
    async fn last_pulled_at_ms(&self, image_ref: &str) -> Option<u64> {
        self.cache.lock().get(image_ref).copied()
    }

    async fn record_pulled(&self, image_ref: &str, at_ms: u64) {
        self.cache.lock().insert(image_ref.to_string(), at_ms);
        self.persist();
    }
}

#[cfg(test)]
#[path = "pull_timestamps_tests.rs"]
mod tests;
