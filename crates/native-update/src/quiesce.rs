// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Restarting the services this updater stopped before the swap (spec
//! §4.H step 10) is `clara-watchdog`/`clara-services`' job, not this
//! crate's — it calls through this seam the same way
//! `clara-watchdog::ServiceRestarter` dispatches by `ServiceKey`.

use async_trait::async_trait;
use clara_core::ServiceKey;

#[async_trait]
pub trait DependentServiceRestarter: Send + Sync {
    /// Best-effort: a failure here is logged by the caller, not propagated,
    /// since the update itself has already succeeded or failed by this point.
    async fn restart(&self, key: &ServiceKey) -> Result<(), String>;
}

#[cfg(feature = "test-support")]
pub struct FakeDependentServiceRestarter {
    restarted: parking_lot::Mutex<Vec<ServiceKey>>,
}

#[cfg(feature = "test-support")]
impl Default for FakeDependentServiceRestarter {
    fn default() -> Self {
        Self { restarted: parking_lot::Mutex::new(Vec::new()) }
    }
}

#[cfg(feature = "test-support")]
impl FakeDependentServiceRestarter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restarted(&self) -> Vec<ServiceKey> {
        self.restarted.lock().clone()
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl DependentServiceRestarter for FakeDependentServiceRestarter {
    async fn restart(&self, key: &ServiceKey) -> Result<(), String> {
        self.restarted.lock().push(key.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "quiesce_tests.rs"]
mod tests;
