// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The `EngineHandle` trait: the orchestrator's only view of a container
//! engine, abstracted over the transport so `ServiceController` never knows
//! whether it's talking to Docker, Podman, or a fake (spec §3 `EngineHandle`).

use async_trait::async_trait;
use clara_core::EngineCandidate;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("container engine unreachable: {0}")]
    Unreachable(String),
    #[error("container not found: {0}")]
    NotFound(String),
    #[error("engine command failed (exit {exit_code:?}): {message}")]
    CommandFailed { exit_code: Option<i32>, message: String },
    #[error("engine operation timed out after {0}ms")]
    Timeout(u64),
    #[error("malformed engine response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortBinding {
    pub host_port: u16,
    pub container_port: u16,
    pub protocol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub env: HashMap<String, String>,
    pub ports: Vec<PortBinding>,
    pub bind_mounts: Vec<(String, String, bool)>,
    pub named_volumes: Vec<(String, String)>,
    pub network: Option<String>,
    pub gpu: bool,
    pub command: Option<Vec<String>>,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerState {
    Running,
    Exited { code: i32 },
    Created,
    Restarting,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    pub ports: Vec<PortBinding>,
}

#[derive(Debug, Clone)]
pub struct PullEvent {
    pub layer_id: String,
    pub status: String,
    pub current: u64,
    pub total: Option<u64>,
}

/// The live, authenticated connection to one discovered container engine.
#[async_trait]
pub trait EngineHandle: Send + Sync {
    /// The candidate this handle was established from, for diagnostics.
    fn candidate(&self) -> &EngineCandidate;

    /// Cheap liveness check; used both by the locator and the watchdog.
    async fn ping(&self) -> Result<(), EngineError>;

    async fn list_containers(&self, label_filter: Option<&str>) -> Result<Vec<ContainerInfo>, EngineError>;

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerInfo>, EngineError>;

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError>;

    async fn start_container(&self, name: &str) -> Result<(), EngineError>;

    async fn stop_container(&self, name: &str, timeout_secs: u32) -> Result<(), EngineError>;

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), EngineError>;

    async fn ensure_network(&self, name: &str) -> Result<(), EngineError>;

    async fn ensure_volume(&self, name: &str) -> Result<(), EngineError>;

    async fn gpu_available(&self) -> Result<bool, EngineError>;

    /// True iff the image is already present in local storage.
    async fn image_exists_locally(&self, image_ref: &str) -> Result<bool, EngineError>;

    /// Checks whether a remote manifest exists without pulling layers.
    async fn remote_manifest_exists(&self, image_ref: &str) -> Result<bool, EngineError>;

    /// Streams pull progress events; the stream ends on completion or yields
    /// an error and ends on failure.
    async fn pull_image(&self, image_ref: &str) -> Result<BoxStream<'static, Result<PullEvent, EngineError>>, EngineError>;

    async fn exec(&self, name: &str, command: &[String]) -> Result<(String, i32), EngineError>;

    async fn container_logs(&self, name: &str, tail_lines: usize) -> Result<String, EngineError>;
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
