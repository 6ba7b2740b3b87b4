// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Data model for image resolution, update checks, and pulls (spec §3, §4.C).

use serde::{Deserialize, Serialize};

/// Freshness window for the "10 day" pull rule (spec §3 invariant).
pub const PULL_FRESHNESS_MS: u64 = 10 * 24 * 60 * 60 * 1000;

/// Throttle window for automatic update checks (spec §4.C).
pub const UPDATE_CHECK_THROTTLE_MS: u64 = 60 * 60 * 1000;

/// True iff a pull is "fresh" per the spec invariant: `now - last_pulled_at
/// < 10 days` OR a forced check was requested.
pub fn is_pull_fresh(last_pulled_at_ms: Option<u64>, now_ms: u64, force: bool) -> bool {
    if force {
        return false;
    }
    match last_pulled_at_ms {
        Some(last) => now_ms.saturating_sub(last) < PULL_FRESHNESS_MS,
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateCheckOutcome {
    UpToDate,
    UpdateAvailable,
    CheckFailed,
}

/// A single normalized progress event from a streamed pull (spec §4.C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullProgressEvent {
    pub image_ref: String,
    pub status_text: String,
    pub percentage: f32,
}

/// Per-layer progress, aggregated into the overall `PullProgressEvent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerProgress {
    pub current: u64,
    pub total: u64,
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
