// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! In-memory `EngineHandle` for tests, gated behind `test-support`.

use crate::handle::{
    ContainerInfo, ContainerSpec, ContainerState, EngineError, EngineHandle, PullEvent,
};
use async_trait::async_trait;
use clara_core::EngineCandidate;
use futures_util::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    containers: HashMap<String, ContainerInfo>,
    networks: Vec<String>,
    volumes: Vec<String>,
    gpu_available: bool,
    reachable: bool,
    pull_script: Vec<Result<PullEvent, String>>,
    local_images: std::collections::HashSet<String>,
    remote_manifests: std::collections::HashSet<String>,
}

/// A scripted in-memory engine for exercising `ServiceController` and the
/// watchdog without touching a real container runtime.
#[derive(Clone)]
pub struct FakeEngineHandle {
    candidate: EngineCandidate,
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngineHandle {
    pub fn new(candidate: EngineCandidate) -> Self {
        Self {
            candidate,
            state: Arc::new(Mutex::new(FakeState { reachable: true, ..Default::default() })),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    pub fn set_gpu_available(&self, available: bool) {
        self.state.lock().gpu_available = available;
    }

    /// Forces a container into a given state, as if the engine changed it
    /// out from under the orchestrator (for watchdog/health tests).
    pub fn force_state(&self, name: &str, state: ContainerState) {
        if let Some(c) = self.state.lock().containers.get_mut(name) {
            c.state = state;
        }
    }

    pub fn set_pull_script(&self, script: Vec<Result<PullEvent, String>>) {
        self.state.lock().pull_script = script;
    }

    pub fn mark_image_local(&self, image_ref: &str) {
        self.state.lock().local_images.insert(image_ref.to_string());
    }

    pub fn mark_remote_manifest(&self, image_ref: &str) {
        self.state.lock().remote_manifests.insert(image_ref.to_string());
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    /// Seeds a running container directly, for tests that need a healthy
    /// `ContainerRunning` predicate without going through create+start.
    pub fn seed_running_container(&self, name: &str) {
        let mut state = self.state.lock();
        state.containers.insert(
            name.to_string(),
            ContainerInfo {
                id: format!("fake-{name}"),
                name: name.to_string(),
                image: String::new(),
                state: ContainerState::Running,
                ports: Vec::new(),
            },
        );
    }
}

#[async_trait]
impl EngineHandle for FakeEngineHandle {
    fn candidate(&self) -> &EngineCandidate {
        &self.candidate
    }

    async fn ping(&self) -> Result<(), EngineError> {
        if self.state.lock().reachable {
            Ok(())
        } else {
            Err(EngineError::Unreachable("fake engine offline".to_string()))
        }
    }

    async fn list_containers(&self, _label_filter: Option<&str>) -> Result<Vec<ContainerInfo>, EngineError> {
        Ok(self.state.lock().containers.values().cloned().collect())
    }

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerInfo>, EngineError> {
        Ok(self.state.lock().containers.get(name).cloned())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        let mut state = self.state.lock();
        let id = format!("fake-{}", spec.name);
        state.containers.insert(
            spec.name.clone(),
            ContainerInfo {
                id: id.clone(),
                name: spec.name.clone(),
                image: spec.image.clone(),
                state: ContainerState::Created,
                ports: spec.ports.clone(),
            },
        );
        Ok(id)
    }

    async fn start_container(&self, name: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        match state.containers.get_mut(name) {
            Some(c) => {
                c.state = ContainerState::Running;
                Ok(())
            }
            None => Err(EngineError::NotFound(name.to_string())),
        }
    }

    async fn stop_container(&self, name: &str, _timeout_secs: u32) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        match state.containers.get_mut(name) {
            Some(c) => {
                c.state = ContainerState::Exited { code: 0 };
                Ok(())
            }
            None => Err(EngineError::NotFound(name.to_string())),
        }
    }

    async fn remove_container(&self, name: &str, _force: bool) -> Result<(), EngineError> {
        self.state.lock().containers.remove(name);
        Ok(())
    }

    async fn ensure_network(&self, name: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if !state.networks.iter().any(|n| n == name) {
            state.networks.push(name.to_string());
        }
        Ok(())
    }

    async fn ensure_volume(&self, name: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if !state.volumes.iter().any(|v| v == name) {
            state.volumes.push(name.to_string());
        }
        Ok(())
    }

    async fn gpu_available(&self) -> Result<bool, EngineError> {
        Ok(self.state.lock().gpu_available)
    }

    async fn image_exists_locally(&self, image_ref: &str) -> Result<bool, EngineError> {
        Ok(self.state.lock().local_images.contains(image_ref))
    }

    async fn remote_manifest_exists(&self, image_ref: &str) -> Result<bool, EngineError> {
        Ok(self.state.lock().remote_manifests.contains(image_ref))
    }

    async fn pull_image(&self, _image_ref: &str) -> Result<BoxStream<'static, Result<PullEvent, EngineError>>, EngineError> {
        let script = self.state.lock().pull_script.clone();
        let events: Vec<Result<PullEvent, EngineError>> = script
            .into_iter()
            .map(|r| r.map_err(EngineError::Unreachable))
            .collect();
        Ok(stream::iter(events).boxed())
    }

    async fn exec(&self, name: &str, _command: &[String]) -> Result<(String, i32), EngineError> {
        if self.state.lock().containers.contains_key(name) {
            Ok((String::new(), 0))
        } else {
            Err(EngineError::NotFound(name.to_string()))
        }
    }

    async fn container_logs(&self, name: &str, _tail_lines: usize) -> Result<String, EngineError> {
        if self.state.lock().containers.contains_key(name) {
            Ok(String::new())
        } else {
            Err(EngineError::NotFound(name.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
