// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Data model for container-engine discovery (spec §3, §4.B).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// A candidate container-engine endpoint, tagged by transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind_tag")]
pub enum EngineEndpoint {
    UnixSocket { path: PathBuf },
    NamedPipe { path: String },
    Tcp { host: String, port: u16, tls: bool, cert_dir: Option<PathBuf> },
    CliContext { name: String, endpoint: String },
    Machine { name: String, url: String, cert_dir: Option<PathBuf> },
    DefaultEnv,
}

/// A discovered candidate: the endpoint plus its ranking metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCandidate {
    pub endpoint: EngineEndpoint,
    /// Lower is better.
    pub priority: i32,
    /// Tiebreaker: order the candidate was discovered in.
    pub discovery_index: usize,
    /// Display label, e.g. "Docker Desktop", "Podman".
    pub kind: String,
}

impl PartialOrd for EngineCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for EngineCandidate {}

impl Ord for EngineCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority).then(self.discovery_index.cmp(&other.discovery_index))
    }
}

/// Outcome of probing one candidate: connection attempt + liveness ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeAttempt {
    pub candidate: EngineCandidate,
    pub succeeded: bool,
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
}

/// The full diagnostic record for troubleshooting (spec §4.B, §8 property 6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocateDiagnostics {
    pub attempts: Vec<ProbeAttempt>,
}

impl LocateDiagnostics {
    pub fn successful_candidate(&self) -> Option<&EngineCandidate> {
        self.attempts.iter().find(|a| a.succeeded).map(|a| &a.candidate)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
