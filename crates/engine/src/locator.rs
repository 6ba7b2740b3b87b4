// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `ContainerEngineLocator` — probes discovered candidates in priority order
//! and returns the first one that answers, while always capturing full
//! diagnostics for troubleshooting (spec §4.B, §8 testable property 6).

use crate::candidates::enumerate_candidates;
use crate::docker_cli::DockerCliHandle;
use crate::handle::{EngineError, EngineHandle};
use clara_core::{EngineCandidate, LocateDiagnostics, ProbeAttempt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

const PER_CANDIDATE_TIMEOUT: Duration = Duration::from_secs(5);
const TOTAL_BUDGET: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
#[error("no container engine reachable after probing {attempted} candidate(s)")]
pub struct EngineUnavailable {
    pub attempted: usize,
    pub diagnostics: LocateDiagnostics,
}

pub struct ContainerEngineLocator {
    home_dir: Option<std::path::PathBuf>,
}

impl Default for ContainerEngineLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerEngineLocator {
    pub fn new() -> Self {
        Self { home_dir: dirs::home_dir() }
    }

    /// Probes every discoverable candidate endpoint in priority order and
    /// returns a live handle to the first one that answers a liveness ping.
    /// Always returns `LocateDiagnostics` describing every attempt made,
    /// whether the overall call succeeds or fails.
    pub async fn locate(&self) -> Result<(Arc<dyn EngineHandle>, LocateDiagnostics), EngineUnavailable> {
        let mut candidates = enumerate_candidates(self.home_dir.as_ref());
        candidates.sort();

        let deadline = Instant::now() + TOTAL_BUDGET;
        let mut diagnostics = LocateDiagnostics::default();

        for candidate in candidates.iter() {
            if Instant::now() >= deadline {
                warn!("container engine locate budget exhausted before exhausting candidates");
                break;
            }

            let attempt_start = Instant::now();
            let probe = tokio::time::timeout(PER_CANDIDATE_TIMEOUT, self.probe_one(candidate)).await;

            let (succeeded, error) = match probe {
                Ok(Ok(())) => (true, None),
                Ok(Err(e)) => (false, Some(e.to_string())),
                Err(_) => (false, Some("probe timed out".to_string())),
            };

            diagnostics.attempts.push(ProbeAttempt {
                candidate: candidate.clone(),
                succeeded,
                response_time_ms: Some(attempt_start.elapsed().as_millis() as u64),
                error,
            });

            if succeeded {
                info!(kind = %candidate.kind, priority = candidate.priority, "container engine located");
                let handle = self.build_handle(candidate);
                return Ok((handle, diagnostics));
            }
            debug!(kind = %candidate.kind, "candidate unreachable, trying next");
        }

        let attempted = diagnostics.attempts.len();
        Err(EngineUnavailable { attempted, diagnostics })
    }

    async fn probe_one(&self, candidate: &EngineCandidate) -> Result<(), EngineError> {
        let handle = self.build_handle(candidate);
        handle.ping().await
    }

    fn build_handle(&self, candidate: &EngineCandidate) -> Arc<dyn EngineHandle> {
        let env = endpoint_env(candidate);
        Arc::new(DockerCliHandle::new(candidate.clone(), "docker", env))
    }
}

/// Translates an endpoint into the environment the `docker` CLI needs to
/// target it (`DOCKER_HOST`, `DOCKER_CONTEXT`, etc).
fn endpoint_env(candidate: &EngineCandidate) -> Vec<(String, String)> {
    use clara_core::EngineEndpoint::*;
    match &candidate.endpoint {
        UnixSocket { path } => vec![("DOCKER_HOST".to_string(), format!("unix://{}", path.display()))],
        NamedPipe { path } => vec![("DOCKER_HOST".to_string(), format!("npipe://{path}"))],
        Tcp { host, port, tls, .. } => {
            let scheme = if *tls { "https" } else { "tcp" };
            vec![("DOCKER_HOST".to_string(), format!("{scheme}://{host}:{port}"))]
        }
        CliContext { name, .. } => vec![("DOCKER_CONTEXT".to_string(), name.clone())],
        Machine { url, .. } => vec![("DOCKER_HOST".to_string(), url.clone())],
        DefaultEnv => Vec::new(),
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
