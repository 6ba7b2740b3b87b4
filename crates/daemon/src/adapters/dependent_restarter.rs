// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Adapts `clara_watchdog::ServiceRestarter` to
//! `clara_native_update::quiesce::DependentServiceRestarter` so
//! `NativeBinaryUpdater::update` can restart whatever the watchdog would
//! have restarted anyway (spec §4.H step 10), without `clara-native-update`
//! depending on `clara-watchdog`.

use async_trait::async_trait;
use clara_core::ServiceKey;
use clara_native_update::DependentServiceRestarter;
use clara_watchdog::ServiceRestarter;
use std::sync::Arc;

pub struct WatchdogDependentRestarter {
    inner: Arc<dyn ServiceRestarter>,
}

impl WatchdogDependentRestarter {
    pub fn new(inner: Arc<dyn ServiceRestarter>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DependentServiceRestarter for WatchdogDependentRestarter {
    async fn restart(&self, key: &ServiceKey) -> Result<(), String> {
        self.inner.restart(key).await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clara_watchdog::RestartError;

    struct AlwaysFails;

    #[async_trait]
    impl ServiceRestarter for AlwaysFails {
        async fn restart(&self, key: &ServiceKey) -> Result<(), RestartError> {
            Err(RestartError::NotRegistered(key.clone()))
        }
    }

    #[tokio::test]
    async fn maps_restart_error_to_string() {
        let adapter = WatchdogDependentRestarter::new(Arc::new(AlwaysFails));
        let err = adapter.restart(&ServiceKey::from("x")).await.unwrap_err();
        assert!(err.contains("no restarter registered"));
    }
}
