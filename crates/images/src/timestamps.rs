// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Abstraction over the "when did we last pull this image" side file (spec
//! §4.C throttle, §4.I `pull_timestamps.json`). The real persistence lives
//! in `clara-storage`; this crate only needs the read/write seam.

use async_trait::async_trait;

#[async_trait]
pub trait PullTimestampStore: Send + Sync {
    async fn last_pulled_at_ms(&self, image_ref: &str) -> Option<u64>;
    async fn record_pulled(&self, image_ref: &str, at_ms: u64);
}

#[cfg(feature = "test-support")]
pub struct FakePullTimestampStore {
    records: parking_lot::Mutex<std::collections::HashMap<String, u64>>,
}

#[cfg(feature = "test-support")]
impl Default for FakePullTimestampStore {
    fn default() -> Self {
        Self { records: parking_lot::Mutex::new(std::collections::HashMap::new()) }
    }
}

#[cfg(feature = "test-support")]
impl FakePullTimestampStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, image_ref: &str, at_ms: u64) {
        self.records.lock().insert(image_ref.to_string(), at_ms);
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl PullTimestampStore for FakePullTimestampStore {
    async fn last_pulled_at_ms(&self, image_ref: &str) -> Option<u64> {
        self.records.lock().get(image_ref).copied()
    }

    async fn record_pulled(&self, image_ref: &str, at_ms: u64) {
        self.records.lock().insert(image_ref.to_string(), at_ms);
    }
}

#[cfg(test)]
#[path = "timestamps_tests.rs"]
mod tests;
