// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `ServiceController`: network/volume provisioning and per-service
//! reconcile-against-engine lifecycle (spec §4.D).

use crate::health::{check_health, HealthContext, HealthError};
use clara_core::{Event, EventLevel, Os, ServiceDef, ServiceKey};
use clara_engine::{ContainerSpec, ContainerState, EngineError, EngineHandle, PortBinding};
use clara_images::{PullError, Puller};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

const STARTUP_SETTLE: Duration = Duration::from_secs(5);
const HEALTH_POLL_ATTEMPTS: usize = 5;
const HEALTH_POLL_GAP: Duration = Duration::from_secs(5);
const STARTUP_LOG_LINES: usize = 50;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("engine error for service {key}: {source}")]
    Engine { key: ServiceKey, source: EngineError },

    #[error("failed to ensure image {image_ref} is present: {source}")]
    ImagePull { image_ref: String, source: PullError },

    #[error("service {key} failed to become healthy after startup; last logs:\n{logs}")]
    StartupFailure { key: ServiceKey, logs: String },

    #[error("health check error for service {key}: {source}")]
    Health { key: ServiceKey, source: HealthError },
}

pub struct ServiceController<C: clara_core::Clock = clara_core::SystemClock> {
    engine: Arc<dyn EngineHandle>,
    puller: Arc<Puller<C>>,
    events: broadcast::Sender<Event>,
    gpu_cache: Mutex<Option<bool>>,
}

impl<C: clara_core::Clock> ServiceController<C> {
    pub fn new(engine: Arc<dyn EngineHandle>, puller: Arc<Puller<C>>, events: broadcast::Sender<Event>) -> Self {
        Self { engine, puller, events, gpu_cache: Mutex::new(None) }
    }

    pub async fn ensure_network(&self, name: &str) -> Result<(), EngineError> {
        self.engine.ensure_network(name).await
    }

    pub async fn ensure_volumes(&self, defs: &[ServiceDef]) -> Result<(), EngineError> {
        for def in defs {
            for volume in &def.named_volumes {
                self.engine.ensure_volume(&volume.volume_name).await?;
            }
        }
        Ok(())
    }

    /// Host-GPU + engine-GPU-runtime capability, probed once and cached for
    /// the process lifetime (spec §4.D "caches until next setup").
    pub async fn gpu_capability(&self) -> bool {
        if let Some(cached) = *self.gpu_cache.lock() {
            return cached;
        }
        let detected = self.engine.gpu_available().await.unwrap_or(false);
        *self.gpu_cache.lock() = Some(detected);
        detected
    }

    /// Forces re-detection of GPU capability on the next call.
    pub fn reset_gpu_cache(&self) {
        *self.gpu_cache.lock() = None;
    }

    /// Reconciles one declared service against the engine's current state,
    /// per spec §4.D's six-step sequence.
    pub async fn reconcile_one(
        &self,
        def: &ServiceDef,
        os: Os,
        network: &str,
        health_ctx: &HealthContext,
    ) -> Result<(), ServiceError> {
        if def.excluded_on(os) {
            info!(key = %def.key, "service excluded on this platform, skipping");
            return Ok(());
        }

        let existing = self
            .engine
            .inspect_container(&def.container_name)
            .await
            .map_err(|source| ServiceError::Engine { key: def.key.clone(), source })?;

        if let Some(info) = existing {
            match info.state {
                ContainerState::Running => {
                    let healthy = check_health(health_ctx, def, &def.health_predicate_id)
                        .await
                        .map_err(|source| ServiceError::Health { key: def.key.clone(), source })?;
                    if healthy {
                        info!(key = %def.key, "service already running and healthy");
                        return Ok(());
                    }
                    warn!(key = %def.key, "running container is unhealthy, recreating");
                    self.stop_and_remove(def).await?;
                }
                _ => {
                    self.stop_and_remove(def).await?;
                }
            }
        }

        self.ensure_image_present(&def.image_ref)
            .await
            .map_err(|source| ServiceError::ImagePull { image_ref: def.image_ref.clone(), source })?;

        let gpu = matches!(def.runtime_hint, clara_core::RuntimeHint::Gpu) && self.gpu_capability().await;
        self.create_and_start(def, network, gpu).await?;
        self.await_healthy(def, health_ctx).await
    }

    /// Restarts an already-created container in place (stop + start, not a
    /// full recreate). Used by the watchdog's recovery path; distinct from
    /// `reconcile_one`'s stop+remove+create replacement sequence.
    pub async fn restart(&self, def: &ServiceDef) -> Result<(), ServiceError> {
        let map_err = |source| ServiceError::Engine { key: def.key.clone(), source };
        self.engine.stop_container(&def.container_name, 10).await.map_err(map_err)?;
        self.engine.start_container(&def.container_name).await.map_err(map_err)
    }

    async fn stop_and_remove(&self, def: &ServiceDef) -> Result<(), ServiceError> {
        let map_err = |source| ServiceError::Engine { key: def.key.clone(), source };
        self.engine.stop_container(&def.container_name, 10).await.map_err(map_err)?;
        self.engine.remove_container(&def.container_name, true).await.map_err(map_err)
    }

    async fn ensure_image_present(&self, image_ref: &str) -> Result<(), PullError> {
        if self
            .engine
            .image_exists_locally(image_ref)
            .await
            .map_err(|source| PullError::Engine { image_ref: image_ref.to_string(), source })?
        {
            return Ok(());
        }

        use futures_util::StreamExt;
        let mut stream = self.puller.pull_stream(image_ref).await?;
        while let Some(event) = stream.next().await {
            event?;
        }
        Ok(())
    }

    async fn create_and_start(&self, def: &ServiceDef, network: &str, gpu: bool) -> Result<(), ServiceError> {
        let map_err = |source| ServiceError::Engine { key: def.key.clone(), source };

        let mut env: HashMap<String, String> = def.env.iter().cloned().collect();
        if gpu {
            env.entry("NVIDIA_VISIBLE_DEVICES".to_string()).or_insert_with(|| "all".to_string());
        }

        let spec = ContainerSpec {
            name: def.container_name.clone(),
            image: def.image_ref.clone(),
            env,
            ports: vec![PortBinding {
                host_port: def.host_port,
                container_port: def.container_port,
                protocol: "tcp".to_string(),
            }],
            bind_mounts: def
                .bind_mounts
                .iter()
                .map(|m| (m.host_path.clone(), m.container_path.clone(), m.read_only))
                .collect(),
            named_volumes: def.named_volumes.iter().map(|v| (v.volume_name.clone(), v.container_path.clone())).collect(),
            network: Some(network.to_string()),
            gpu,
            command: None,
            labels: HashMap::from([("clara.service".to_string(), def.key.to_string())]),
        };

        self.engine.create_container(&spec).await.map_err(map_err)?;
        self.engine.start_container(&def.container_name).await.map_err(map_err)
    }

    async fn await_healthy(&self, def: &ServiceDef, health_ctx: &HealthContext) -> Result<(), ServiceError> {
        tokio::time::sleep(STARTUP_SETTLE).await;

        let mut healthy = false;
        for attempt in 0..HEALTH_POLL_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(HEALTH_POLL_GAP).await;
            }
            match check_health(health_ctx, def, &def.health_predicate_id).await {
                Ok(true) => {
                    healthy = true;
                    break;
                }
                Ok(false) => continue,
                Err(e) => warn!(key = %def.key, error = %e, "health check errored during startup poll"),
            }
        }

        if healthy {
            self.emit_state(def, "healthy");
            Ok(())
        } else {
            let logs = self
                .engine
                .container_logs(&def.container_name, STARTUP_LOG_LINES)
                .await
                .unwrap_or_else(|_| String::new());
            error!(key = %def.key, "service failed to become healthy after startup");
            self.emit_state(def, "failed");
            Err(ServiceError::StartupFailure { key: def.key.clone(), logs })
        }
    }

    fn emit_state(&self, def: &ServiceDef, status: &str) {
        let _ = self.events.send(Event::ServiceState {
            key: def.key.to_string(),
            status: status.to_string(),
            last_check_at_ms: None,
            consecutive_failures: 0,
        });
        if status == "failed" {
            let _ = self.events.send(Event::WatchdogNotice {
                title: format!("{} failed to start", def.key),
                body: "see logs for details".to_string(),
                level: EventLevel::Error,
            });
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
