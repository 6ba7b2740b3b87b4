// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Process-backed supervision for the native LLM-serving binary. Unlike the
//! containerized services, this "service" is a bare child process this
//! crate spawns and owns directly -- there is no `EngineHandle` seam for it.
//! `clara-watchdog::ServiceRestarter` and `clara-services::health::
//! ProcessLivenessProbe` both dispatch here for `clara_daemon::catalog::
//! native_service_key()` (spec §4.E `ProcessAlivePortOpen`, §4.F restart).

use async_trait::async_trait;
use clara_core::ServiceKey;
use clara_services::health::ProcessLivenessProbe;
use clara_watchdog::{RestartError, ServiceRestarter};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NativeProcessError {
    #[error("native binary path is not configured")]
    NotConfigured,
    #[error("failed to spawn native binary at {0:?}: {1}")]
    SpawnFailed(PathBuf, String),
    #[error("native binary process is not running")]
    NotRunning,
}

/// What the setup coordinator hands this supervisor to launch the binary
/// with (spec §4.H "detection of bundled vs. downloaded binary locations").
#[derive(Debug, Clone)]
pub struct NativeLaunchSpec {
    pub binary_path: PathBuf,
    pub args: Vec<String>,
    pub models_dir: PathBuf,
    pub port: u16,
}

struct Inner {
    spec: Option<NativeLaunchSpec>,
    child: Option<Child>,
}

/// Owns the native LLM-serving binary's child process. A single instance is
/// shared between the command dispatcher (`llm.start`/`stop`/`restart`) and
/// the watchdog's restart seam.
pub struct NativeProcessSupervisor {
    key: ServiceKey,
    inner: Mutex<Inner>,
}

impl NativeProcessSupervisor {
    pub fn new(key: ServiceKey) -> Self {
        Self { key, inner: Mutex::new(Inner { spec: None, child: None }) }
    }

    pub fn service_key(&self) -> &ServiceKey {
        &self.key
    }

    /// Swaps in a new launch spec (binary path, args, models dir, port).
    /// Called once at setup and again after `clara-native-update` swaps the
    /// installed binary (spec §4.H step 10's "restart previously-stopped
    /// services" needs the *new* binary path, not the one cached at boot).
    pub async fn reconfigure(&self, spec: NativeLaunchSpec) {
        self.inner.lock().await.spec = Some(spec);
    }

    pub async fn is_running(&self) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    pub async fn start(&self) -> Result<(), NativeProcessError> {
        let mut guard = self.inner.lock().await;
        if let Some(child) = guard.child.as_mut() {
            if matches!(child.try_wait(), Ok(None)) {
                return Ok(());
            }
        }
        let spec = guard.spec.clone().ok_or(NativeProcessError::NotConfigured)?;

        let child = Command::new(&spec.binary_path)
            .args(&spec.args)
            .arg("--port")
            .arg(spec.port.to_string())
            .arg("--models-dir")
            .arg(&spec.models_dir)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| NativeProcessError::SpawnFailed(spec.binary_path.clone(), e.to_string()))?;

        info!(pid = ?child.id(), port = spec.port, "started native llm binary");
        guard.child = Some(child);
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), NativeProcessError> {
        let mut guard = self.inner.lock().await;
        let Some(mut child) = guard.child.take() else {
            return Err(NativeProcessError::NotRunning);
        };
        if let Err(e) = child.start_kill() {
            warn!(error = %e, "failed to signal native llm binary to stop");
        }
        let _ = child.wait().await;
        Ok(())
    }

    /// Lists installed model files by stem, sorted. A thin stand-in for the
    /// `llm.models` command surface -- reading weight contents is explicitly
    /// out of scope (spec §1 Non-goals).
    pub async fn list_models(&self) -> Vec<String> {
        let models_dir = match self.inner.lock().await.spec.as_ref() {
            Some(spec) => spec.models_dir.clone(),
            None => return Vec::new(),
        };
        let mut names = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(&models_dir).await else {
            return names;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("gguf") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names
    }
}

#[async_trait]
impl ServiceRestarter for NativeProcessSupervisor {
    async fn restart(&self, key: &ServiceKey) -> Result<(), RestartError> {
        if *key != self.key {
            return Err(RestartError::NotRegistered(key.clone()));
        }
        if self.is_running().await {
            let _ = self.stop().await;
        }
        self.start().await.map_err(|e| RestartError::Process(e.to_string()))
    }
}

#[async_trait]
impl ProcessLivenessProbe for NativeProcessSupervisor {
    async fn is_alive(&self, service_key: &ServiceKey) -> bool {
        *service_key == self.key && self.is_running().await
    }
}

/// Convenience alias so the daemon can register one supervisor under both
/// seams without an `Arc<dyn Trait>` per trait.
pub fn as_restarter(supervisor: Arc<NativeProcessSupervisor>) -> Arc<dyn ServiceRestarter> {
    supervisor
}

pub fn as_liveness_probe(supervisor: Arc<NativeProcessSupervisor>) -> Arc<dyn ProcessLivenessProbe> {
    supervisor
}
