// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The watchdog's view of "restart this service" (spec §4.F step 4:
//! "container restart or process respawn"). The watchdog itself never
//! touches an `EngineHandle` or a child process directly — it calls through
//! this seam, matching the Design Notes' closed-dispatch pattern used for
//! health predicates (`clara-services::health`).

use async_trait::async_trait;
use clara_core::ServiceKey;
use clara_services::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestartError {
    #[error("no restarter registered for service {0}")]
    NotRegistered(ServiceKey),
    #[error("service restart failed: {0}")]
    Service(#[from] ServiceError),
    #[error("process respawn failed: {0}")]
    Process(String),
}

/// Performs the service-specific restart action for one `ServiceKey`.
/// Container-backed services restart via `clara-services::ServiceController`;
/// process-backed services (the native LLM binary) respawn their child
/// process. The watchdog is agnostic to which.
#[async_trait]
pub trait ServiceRestarter: Send + Sync {
    async fn restart(&self, key: &ServiceKey) -> Result<(), RestartError>;
}

/// Dispatches to per-key restarters registered at setup time, so one
/// `Watchdog` can supervise a mix of container and process services without
/// knowing which is which.
pub struct RestarterRegistry {
    restarters: std::collections::HashMap<ServiceKey, std::sync::Arc<dyn ServiceRestarter>>,
}

impl RestarterRegistry {
    pub fn new() -> Self {
        Self { restarters: std::collections::HashMap::new() }
    }

    pub fn register(&mut self, key: ServiceKey, restarter: std::sync::Arc<dyn ServiceRestarter>) {
        self.restarters.insert(key, restarter);
    }
}

impl Default for RestarterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceRestarter for RestarterRegistry {
    async fn restart(&self, key: &ServiceKey) -> Result<(), RestartError> {
        match self.restarters.get(key) {
            Some(restarter) => restarter.restart(key).await,
            None => Err(RestartError::NotRegistered(key.clone())),
        }
    }
}

/// Restarts one container-backed `ServiceDef` in place via its
/// `ServiceController` (stop + start, not a full recreate).
pub struct ContainerRestarter<C: clara_core::Clock = clara_core::SystemClock> {
    controller: std::sync::Arc<clara_services::ServiceController<C>>,
    def: clara_core::ServiceDef,
}

impl<C: clara_core::Clock> ContainerRestarter<C> {
    pub fn new(controller: std::sync::Arc<clara_services::ServiceController<C>>, def: clara_core::ServiceDef) -> Self {
        Self { controller, def }
    }
}

#[async_trait]
impl<C: clara_core::Clock> ServiceRestarter for ContainerRestarter<C> {
    async fn restart(&self, _key: &ServiceKey) -> Result<(), RestartError> {
        self.controller.restart(&self.def).await.map_err(RestartError::Service)
    }
}

#[cfg(feature = "test-support")]
pub struct FakeRestarter {
    pub outcomes: parking_lot::Mutex<std::collections::HashMap<String, Result<(), String>>>,
    pub calls: parking_lot::Mutex<Vec<ServiceKey>>,
}

#[cfg(feature = "test-support")]
impl Default for FakeRestarter {
    fn default() -> Self {
        Self { outcomes: parking_lot::Mutex::new(std::collections::HashMap::new()), calls: parking_lot::Mutex::new(Vec::new()) }
    }
}

#[cfg(feature = "test-support")]
impl FakeRestarter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_outcome(&self, key: &str, result: Result<(), String>) {
        self.outcomes.lock().insert(key.to_string(), result);
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls.lock().iter().filter(|k| k.as_str() == key).count()
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl ServiceRestarter for FakeRestarter {
    async fn restart(&self, key: &ServiceKey) -> Result<(), RestartError> {
        self.calls.lock().push(key.clone());
        match self.outcomes.lock().get(key.as_str()) {
            Some(Ok(())) => Ok(()),
            Some(Err(message)) => Err(RestartError::Process(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
