// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Stand-in `EngineHandle` used when `clara-engine::ContainerEngineLocator`
//! finds nothing to connect to (spec §7 `EnvironmentBlocker`: "orchestrator
//! continues in a degraded mode where possible"). Every operation fails
//! with `EngineError::Unreachable` so the containerized `ServiceDef`s
//! surface as failed/stopped to the watchdog instead of panicking the
//! daemon for want of a real handle.

use async_trait::async_trait;
use clara_core::EngineCandidate;
use clara_engine::{ContainerInfo, ContainerSpec, EngineError, EngineHandle, PullEvent};
use futures_util::stream::BoxStream;

pub struct NullEngineHandle {
    candidate: EngineCandidate,
}

impl NullEngineHandle {
    pub fn new() -> Self {
        Self {
            candidate: EngineCandidate {
                endpoint: clara_core::EngineEndpoint::DefaultEnv,
                priority: i32::MAX,
                discovery_index: 0,
                kind: "unavailable".to_string(),
            },
        }
    }
}

impl Default for NullEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

fn unreachable_err() -> EngineError {
    EngineError::Unreachable("no container engine was located during setup".to_string())
}

#[async_trait]
impl EngineHandle for NullEngineHandle {
    fn candidate(&self) -> &EngineCandidate {
        &self.candidate
    }

    async fn ping(&self) -> Result<(), EngineError> {
        Err(unreachable_err())
    }

    async fn list_containers(&self, _label_filter: Option<&str>) -> Result<Vec<ContainerInfo>, EngineError> {
        Err(unreachable_err())
    }

    async fn inspect_container(&self, _name: &str) -> Result<Option<ContainerInfo>, EngineError> {
        Err(unreachable_err())
    }

    async fn create_container(&self, _spec: &ContainerSpec) -> Result<String, EngineError> {
        Err(unreachable_err())
    }

    async fn start_container(&self, _name: &str) -> Result<(), EngineError> {
        Err(unreachable_err())
    }

    async fn stop_container(&self, _name: &str, _timeout_secs: u32) -> Result<(), EngineError> {
        Err(unreachable_err())
    }

    async fn remove_container(&self, _name: &str, _force: bool) -> Result<(), EngineError> {
        Err(unreachable_err())
    }

    async fn ensure_network(&self, _name: &str) -> Result<(), EngineError> {
        Err(unreachable_err())
    }

    async fn ensure_volume(&self, _name: &str) -> Result<(), EngineError> {
        Err(unreachable_err())
    }

    async fn gpu_available(&self) -> Result<bool, EngineError> {
        Ok(false)
    }

    async fn image_exists_locally(&self, _image_ref: &str) -> Result<bool, EngineError> {
        Err(unreachable_err())
    }

    async fn remote_manifest_exists(&self, _image_ref: &str) -> Result<bool, EngineError> {
        Err(unreachable_err())
    }

    async fn pull_image(&self, _image_ref: &str) -> Result<BoxStream<'static, Result<PullEvent, EngineError>>, EngineError> {
        Err(unreachable_err())
    }

    async fn exec(&self, _name: &str, _command: &[String]) -> Result<(String, i32), EngineError> {
        Err(unreachable_err())
    }

    async fn container_logs(&self, _name: &str, _tail_lines: usize) -> Result<String, EngineError> {
        Err(unreachable_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ping_fails_unreachable() {
        let handle = NullEngineHandle::new();
        let err = handle.ping().await.unwrap_err();
        assert!(matches!(err, EngineError::Unreachable(_)));
    }

    #[tokio::test]
    async fn gpu_available_reports_false_rather_than_erroring() {
        let handle = NullEngineHandle::new();
        assert_eq!(handle.gpu_available().await, Ok(false));
    }
}
