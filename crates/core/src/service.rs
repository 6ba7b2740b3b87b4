// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Data model for declared services and their runtime state (spec §3, §4.D).

use crate::ids::ServiceKey;
use crate::platform::Os;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeHint {
    Default,
    Gpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    Always,
    UnlessStopped,
    OnFailure,
}

/// Identifies which `HealthPredicate` (owned by `clara-services::health`)
/// applies to a service, per the Design Notes' closed-enum redesign flag
/// (replacing duck-typed dispatch over service configs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum HealthPredicateId {
    HttpGet { path: String, timeout_ms: u64, json_status_field: Option<String> },
    ContainerRunning,
    ProcessAlivePortOpen { port: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindMount {
    pub host_path: String,
    pub container_path: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedVolumeMount {
    pub volume_name: String,
    pub container_path: String,
}

/// A statically declared service definition. Never mutated at runtime
/// (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDef {
    pub key: ServiceKey,
    pub container_name: String,
    pub image_ref: String,
    pub host_port: u16,
    pub container_port: u16,
    #[serde(default)]
    pub bind_mounts: Vec<BindMount>,
    #[serde(default)]
    pub named_volumes: Vec<NamedVolumeMount>,
    #[serde(default)]
    pub env: Vec<(String, String)>,
    pub runtime_hint: RuntimeHint,
    pub restart_policy: RestartPolicy,
    pub health_predicate_id: HealthPredicateId,
    /// OSes on which this service is allowed to run at all.
    pub platform_gate: HashSet<Os>,
}

impl ServiceDef {
    /// True iff this service is excluded on the given host OS (spec §3
    /// invariant: forced to `disabled`, never started).
    pub fn excluded_on(&self, os: Os) -> bool {
        !self.platform_gate.contains(&os)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Unknown,
    Starting,
    Healthy,
    Unhealthy,
    Failed,
    Disabled,
    Stopped,
}

/// Mutable runtime state, owned by the Watchdog; read-only to the rest of
/// the system (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceState {
    pub status: ServiceStatus,
    pub last_check_at_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub recovering: bool,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self {
            status: ServiceStatus::Unknown,
            last_check_at_ms: None,
            consecutive_failures: 0,
            recovering: false,
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
