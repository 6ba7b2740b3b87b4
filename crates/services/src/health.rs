// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Closed-enum health-predicate dispatch (spec §4.E), replacing duck-typed
//! dispatch over service configs per the Design Notes' redesign flag.

use async_trait::async_trait;
use clara_core::{HealthPredicateId, ServiceDef};
use clara_engine::EngineHandle;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const MAX_PREDICATE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("health check timed out")]
    Timeout,
    #[error("engine error during health check: {0}")]
    Engine(#[from] clara_engine::EngineError),
    #[error("http error during health check: {0}")]
    Http(String),
}

/// Reports whether a natively-spawned (non-container) process is still
/// alive, keyed by service. Backed by `clara-mcp`'s process table for
/// services that run as bare processes rather than containers.
#[async_trait]
pub trait ProcessLivenessProbe: Send + Sync {
    async fn is_alive(&self, service_key: &clara_core::ServiceKey) -> bool;
}

pub struct HealthContext {
    pub engine: Arc<dyn EngineHandle>,
    pub http_client: reqwest::Client,
    pub process_probe: Arc<dyn ProcessLivenessProbe>,
}

/// Evaluates `predicate` against `service`, bounding every check at 5s
/// regardless of the predicate's own configured timeout (spec §4.E).
pub async fn check_health(
    ctx: &HealthContext,
    service: &ServiceDef,
    predicate: &HealthPredicateId,
) -> Result<bool, HealthError> {
    let fut = check_health_inner(ctx, service, predicate);
    match tokio::time::timeout(MAX_PREDICATE_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(HealthError::Timeout),
    }
}

async fn check_health_inner(
    ctx: &HealthContext,
    service: &ServiceDef,
    predicate: &HealthPredicateId,
) -> Result<bool, HealthError> {
    match predicate {
        HealthPredicateId::HttpGet { path, timeout_ms, json_status_field } => {
            http_get_healthy(ctx, service.host_port, path, *timeout_ms, json_status_field.as_deref()).await
        }
        HealthPredicateId::ContainerRunning => container_running(ctx, &service.container_name).await,
        HealthPredicateId::ProcessAlivePortOpen { port } => {
            process_alive_port_open(ctx, &service.key, *port).await
        }
    }
}

async fn http_get_healthy(
    ctx: &HealthContext,
    port: u16,
    path: &str,
    timeout_ms: u64,
    json_status_field: Option<&str>,
) -> Result<bool, HealthError> {
    let url = format!("http://127.0.0.1:{port}{path}");
    let response = ctx
        .http_client
        .get(&url)
        .timeout(Duration::from_millis(timeout_ms.min(MAX_PREDICATE_TIMEOUT.as_millis() as u64)))
        .send()
        .await
        .map_err(|e| HealthError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Ok(false);
    }

    let Some(field) = json_status_field else {
        return Ok(true);
    };

    let body: serde_json::Value = match response.json().await {
        Ok(body) => body,
        Err(_) => return Ok(false),
    };
    let status_value = body.get(field).and_then(|v| v.as_str()).unwrap_or("");
    Ok(matches!(status_value, "healthy" | "ok"))
}

async fn container_running(ctx: &HealthContext, container_name: &str) -> Result<bool, HealthError> {
    let info = ctx.engine.inspect_container(container_name).await?;
    Ok(matches!(info.map(|c| c.state), Some(clara_engine::ContainerState::Running)))
}

async fn process_alive_port_open(
    ctx: &HealthContext,
    service_key: &clara_core::ServiceKey,
    port: u16,
) -> Result<bool, HealthError> {
    if !ctx.process_probe.is_alive(service_key).await {
        return Ok(false);
    }
    Ok(tcp_connect_succeeds(port).await)
}

async fn tcp_connect_succeeds(port: u16) -> bool {
    let addr = format!("127.0.0.1:{port}");
    tokio::time::timeout(Duration::from_secs(2), tokio::net::TcpStream::connect(&addr))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false)
}

#[cfg(feature = "test-support")]
pub struct FakeProcessLivenessProbe {
    alive: parking_lot::Mutex<std::collections::HashSet<String>>,
}

#[cfg(feature = "test-support")]
impl Default for FakeProcessLivenessProbe {
    fn default() -> Self {
        Self { alive: parking_lot::Mutex::new(std::collections::HashSet::new()) }
    }
}

#[cfg(feature = "test-support")]
impl FakeProcessLivenessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alive(&self, service_key: &clara_core::ServiceKey, alive: bool) {
        let mut set = self.alive.lock();
        if alive {
            set.insert(service_key.as_str().to_string());
        } else {
            set.remove(service_key.as_str());
        }
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl ProcessLivenessProbe for FakeProcessLivenessProbe {
    async fn is_alive(&self, service_key: &clara_core::ServiceKey) -> bool {
        self.alive.lock().contains(service_key.as_str())
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
