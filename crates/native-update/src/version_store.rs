// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Persistence seam for the installed-version marker (`version.txt`). Kept
//! local the same way `clara-mcp::McpRegistryStore` and
//! `clara-images::PullTimestampStore` are: this crate never depends on
//! `clara-storage` directly, its caller wires the concrete file-backed
//! implementation in.

use async_trait::async_trait;

#[async_trait]
pub trait VersionStore: Send + Sync {
    async fn read_version(&self) -> Option<String>;
    async fn write_version(&self, version: &str) -> Result<(), std::io::Error>;
}

#[cfg(feature = "test-support")]
pub struct FakeVersionStore {
    version: parking_lot::Mutex<Option<String>>,
}

#[cfg(feature = "test-support")]
impl FakeVersionStore {
    pub fn new(initial: Option<&str>) -> Self {
        Self { version: parking_lot::Mutex::new(initial.map(str::to_string)) }
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl VersionStore for FakeVersionStore {
    async fn read_version(&self) -> Option<String> {
        self.version.lock().clone()
    }

    async fn write_version(&self, version: &str) -> Result<(), std::io::Error> {
        *self.version.lock() = Some(version.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "version_store_tests.rs"]
mod tests;
