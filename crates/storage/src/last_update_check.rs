// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `last_update_check.json`: the single timestamp backing the 1-hour
//! auto-update-check throttle (spec §4.C "Throttle").

use crate::atomic::{load_json_tolerant, save_json_atomic};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

const AUTO_CHECK_THROTTLE_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    schema_version: u32,
    last_checked_at_ms: Option<u64>,
}

pub struct LastUpdateCheckFile {
    path: PathBuf,
}

impl LastUpdateCheckFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// True iff an automatic update check should run now: no prior record,
    /// or the last one is older than the 1-hour throttle window.
    pub fn should_check_now(&self, now_ms: u64) -> bool {
        let doc: Document = load_json_tolerant(&self.path);
        match doc.last_checked_at_ms {
            Some(last) => now_ms.saturating_sub(last) >= AUTO_CHECK_THROTTLE_MS,
            None => true,
        }
    }

    pub fn record_checked(&self, now_ms: u64) {
        let doc = Document { schema_version: 1, last_checked_at_ms: Some(now_ms) };
        if let Err(e) = save_json_atomic(&self.path, &doc) {
            warn!(error = %e, path = %self.path.display(), "failed to persist last update check");
        }
    }
}

#[cfg(test)]
#[path = "last_update_check_tests.rs"]
mod tests;
