// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Real `EngineHandle` implementation that shells out to the `docker` CLI.
//!
//! Docker and Podman both ship a CLI that understands `DOCKER_HOST`/context
//! switching, so rather than speaking the Docker Engine API wire protocol
//! directly we invoke the CLI and point it at the discovered endpoint via
//! environment variables. This mirrors how the daemon already drove
//! container lifecycle in its previous incarnation.

use crate::handle::{
    ContainerInfo, ContainerSpec, ContainerState, EngineError, EngineHandle, PullEvent,
};
use async_trait::async_trait;
use clara_core::EngineCandidate;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

#[derive(Clone)]
pub struct DockerCliHandle {
    candidate: EngineCandidate,
    binary: &'static str,
    env: Vec<(String, String)>,
}

impl DockerCliHandle {
    pub fn new(candidate: EngineCandidate, binary: &'static str, env: Vec<(String, String)>) -> Self {
        Self { candidate, binary, env }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(self.binary);
        cmd.args(args);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        cmd
    }

    async fn run(&self, args: &[&str]) -> Result<String, EngineError> {
        let output = self
            .command(args)
            .output()
            .await
            .map_err(|e| EngineError::Unreachable(format!("failed to exec {}: {e}", self.binary)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(EngineError::CommandFailed {
                exit_code: output.status.code(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct PsEntry {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "State")]
    state: String,
}

fn parse_state(raw: &str) -> ContainerState {
    match raw {
        "running" => ContainerState::Running,
        "created" => ContainerState::Created,
        "restarting" => ContainerState::Restarting,
        s if s.starts_with("exited") => ContainerState::Exited { code: 0 },
        _ => ContainerState::Unknown,
    }
}

#[async_trait]
impl EngineHandle for DockerCliHandle {
    fn candidate(&self) -> &EngineCandidate {
        &self.candidate
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.run(&["version", "--format", "{{.Server.Version}}"]).await.map(|_| ())
    }

    async fn list_containers(&self, label_filter: Option<&str>) -> Result<Vec<ContainerInfo>, EngineError> {
        let mut args = vec!["ps", "--all", "--format", "{{json .}}"];
        if let Some(label) = label_filter {
            args.push("--filter");
            args.push(label);
        }
        let raw = self.run(&args).await?;
        let mut containers = Vec::new();
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            let entry: PsEntry = serde_json::from_str(line)
                .map_err(|e| EngineError::Malformed(format!("unparseable ps line: {e}")))?;
            containers.push(ContainerInfo {
                id: entry.id,
                name: entry.names,
                image: entry.image,
                state: parse_state(&entry.state),
                ports: Vec::new(),
            });
        }
        Ok(containers)
    }

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerInfo>, EngineError> {
        match self.run(&["inspect", name]).await {
            Ok(_) => Ok(self.list_containers(None).await?.into_iter().find(|c| c.name == name)),
            Err(EngineError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        let mut args: Vec<String> = vec!["create".to_string(), "--name".to_string(), spec.name.clone()];
        for (k, v) in &spec.env {
            args.push("-e".to_string());
            args.push(format!("{k}={v}"));
        }
        for binding in &spec.ports {
            args.push("-p".to_string());
            args.push(format!("{}:{}", binding.host_port, binding.container_port));
        }
        for (host, container, ro) in &spec.bind_mounts {
            args.push("-v".to_string());
            args.push(if *ro {
                format!("{host}:{container}:ro")
            } else {
                format!("{host}:{container}")
            });
        }
        for (name, mount) in &spec.named_volumes {
            args.push("-v".to_string());
            args.push(format!("{name}:{mount}"));
        }
        if let Some(network) = &spec.network {
            args.push("--network".to_string());
            args.push(network.clone());
        }
        if spec.gpu {
            args.push("--gpus".to_string());
            args.push("all".to_string());
        }
        for (k, v) in &spec.labels {
            args.push("--label".to_string());
            args.push(format!("{k}={v}"));
        }
        args.push(spec.image.clone());
        if let Some(command) = &spec.command {
            args.extend(command.iter().cloned());
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs).await
    }

    async fn start_container(&self, name: &str) -> Result<(), EngineError> {
        self.run(&["start", name]).await.map(|_| ())
    }

    async fn stop_container(&self, name: &str, timeout_secs: u32) -> Result<(), EngineError> {
        self.run(&["stop", "-t", &timeout_secs.to_string(), name]).await.map(|_| ())
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), EngineError> {
        if force {
            self.run(&["rm", "-f", name]).await.map(|_| ())
        } else {
            self.run(&["rm", name]).await.map(|_| ())
        }
    }

    async fn ensure_network(&self, name: &str) -> Result<(), EngineError> {
        match self.run(&["network", "inspect", name]).await {
            Ok(_) => Ok(()),
            Err(_) => self.run(&["network", "create", name]).await.map(|_| ()),
        }
    }

    async fn ensure_volume(&self, name: &str) -> Result<(), EngineError> {
        match self.run(&["volume", "inspect", name]).await {
            Ok(_) => Ok(()),
            Err(_) => self.run(&["volume", "create", name]).await.map(|_| ()),
        }
    }

    async fn gpu_available(&self) -> Result<bool, EngineError> {
        Ok(self.run(&["info", "--format", "{{.Runtimes}}"]).await.map(|out| out.contains("nvidia")).unwrap_or(false))
    }

    async fn image_exists_locally(&self, image_ref: &str) -> Result<bool, EngineError> {
        match self.run(&["image", "inspect", image_ref]).await {
            Ok(_) => Ok(true),
            Err(EngineError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn remote_manifest_exists(&self, image_ref: &str) -> Result<bool, EngineError> {
        match self.run(&["manifest", "inspect", image_ref]).await {
            Ok(_) => Ok(true),
            Err(EngineError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn pull_image(&self, image_ref: &str) -> Result<BoxStream<'static, Result<PullEvent, EngineError>>, EngineError> {
        let mut child = self
            .command(&["pull", image_ref])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::Unreachable(format!("failed to spawn pull: {e}")))?;

        let stdout = child.stdout.take().ok_or_else(|| EngineError::Malformed("pull produced no stdout".into()))?;
        let reader = BufReader::new(stdout);
        let mut lines = reader.lines();

        let mut events = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            events.push(Ok(PullEvent {
                layer_id: line.split_whitespace().next().unwrap_or("").to_string(),
                status: line.clone(),
                current: 0,
                total: None,
            }));
        }

        let status = child.wait().await.map_err(|e| EngineError::Unreachable(e.to_string()))?;
        if !status.success() {
            events.push(Err(EngineError::CommandFailed {
                exit_code: status.code(),
                message: format!("pull of {image_ref} failed"),
            }));
        }

        Ok(stream::iter(events).boxed())
    }

    async fn exec(&self, name: &str, command: &[String]) -> Result<(String, i32), EngineError> {
        let mut args: Vec<&str> = vec!["exec", name];
        args.extend(command.iter().map(String::as_str));
        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| EngineError::Unreachable(e.to_string()))?;
        Ok((String::from_utf8_lossy(&output.stdout).to_string(), output.status.code().unwrap_or(-1)))
    }

    async fn container_logs(&self, name: &str, tail_lines: usize) -> Result<String, EngineError> {
        self.run(&["logs", "--tail", &tail_lines.to_string(), name]).await
    }
}

#[cfg(test)]
#[path = "docker_cli_tests.rs"]
mod tests;
