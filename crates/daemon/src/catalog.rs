// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The fixed catalog of orchestrated services (spec §4.D; §9 "hardcoded
//! ports"). Three containerized services plus the native LLM-serving
//! binary, which `clara-daemon` runs as a bare subprocess rather than a
//! container -- see [`native_service_key`] for how it's represented to the
//! watchdog and health-check layers anyway.

use std::collections::HashSet;

use clara_core::{BindMount, HealthPredicateId, NamedVolumeMount, Os, RestartPolicy, RuntimeHint, ServiceDef, ServiceKey};

pub const PYTHON_BACKEND_PORT: u16 = 5001;
pub const N8N_PORT: u16 = 5678;
pub const COMFYUI_PORT: u16 = 8188;

const ALL_OSES: [Os; 3] = [Os::Linux, Os::Darwin, Os::Windows];

fn all_except(excluded: Os) -> HashSet<Os> {
    ALL_OSES.iter().copied().filter(|os| *os != excluded).collect()
}

fn all_oses() -> HashSet<Os> {
    ALL_OSES.iter().copied().collect()
}

/// `ServiceKey` for the native LLM-serving binary. It never appears as a
/// container, but the watchdog and event bus key it the same way as the
/// containerized services so callers don't special-case it.
pub fn native_service_key() -> ServiceKey {
    ServiceKey::from("llm-server")
}

pub fn python_backend_def() -> ServiceDef {
    ServiceDef {
        key: ServiceKey::from("python-backend"),
        container_name: "clara-python-backend".to_string(),
        image_ref: "clara-ai/python-backend:latest".to_string(),
        host_port: PYTHON_BACKEND_PORT,
        container_port: PYTHON_BACKEND_PORT,
        bind_mounts: vec![BindMount {
            host_path: "clara-data".to_string(),
            container_path: "/data".to_string(),
            read_only: false,
        }],
        named_volumes: Vec::new(),
        env: Vec::new(),
        runtime_hint: RuntimeHint::Gpu,
        restart_policy: RestartPolicy::UnlessStopped,
        health_predicate_id: HealthPredicateId::HttpGet {
            path: "/health".to_string(),
            timeout_ms: 5_000,
            json_status_field: Some("status".to_string()),
        },
        platform_gate: all_oses(),
    }
}

pub fn n8n_def() -> ServiceDef {
    ServiceDef {
        key: ServiceKey::from("n8n"),
        container_name: "clara-n8n".to_string(),
        image_ref: "docker.n8n.io/n8nio/n8n:latest".to_string(),
        host_port: N8N_PORT,
        container_port: N8N_PORT,
        bind_mounts: Vec::new(),
        named_volumes: vec![NamedVolumeMount {
            volume_name: "clara-n8n-data".to_string(),
            container_path: "/home/node/.n8n".to_string(),
        }],
        env: Vec::new(),
        runtime_hint: RuntimeHint::Default,
        restart_policy: RestartPolicy::UnlessStopped,
        health_predicate_id: HealthPredicateId::ContainerRunning,
        platform_gate: all_oses(),
    }
}

/// ComfyUI is excluded on macOS (spec §8 scenario S3: "selected on macOS,
/// treated as platform-excluded") even when the user has enabled it in
/// `clara-features.yaml`.
pub fn comfyui_def() -> ServiceDef {
    ServiceDef {
        key: ServiceKey::from("comfyui"),
        container_name: "clara-comfyui".to_string(),
        image_ref: "clara-ai/comfyui:latest".to_string(),
        host_port: COMFYUI_PORT,
        container_port: COMFYUI_PORT,
        bind_mounts: Vec::new(),
        named_volumes: vec![NamedVolumeMount {
            volume_name: "clara-comfyui-data".to_string(),
            container_path: "/root/comfy/ComfyUI/models".to_string(),
        }],
        env: Vec::new(),
        runtime_hint: RuntimeHint::Gpu,
        restart_policy: RestartPolicy::UnlessStopped,
        health_predicate_id: HealthPredicateId::HttpGet { path: "/system_stats".to_string(), timeout_ms: 5_000, json_status_field: None },
        platform_gate: all_except(Os::Darwin),
    }
}

/// The native LLM-serving binary, represented as a process-backed
/// pseudo-service so the watchdog and GUI see it through the same
/// `ServiceState`/`Event::ServiceState` machinery as the containerized
/// services (spec §4.E `ProcessAlivePortOpen`).
pub fn native_llm_def(port: u16) -> ServiceDef {
    ServiceDef {
        key: native_service_key(),
        container_name: String::new(),
        image_ref: String::new(),
        host_port: port,
        container_port: port,
        bind_mounts: Vec::new(),
        named_volumes: Vec::new(),
        env: Vec::new(),
        runtime_hint: RuntimeHint::Default,
        restart_policy: RestartPolicy::Always,
        health_predicate_id: HealthPredicateId::ProcessAlivePortOpen { port },
        platform_gate: all_oses(),
    }
}

/// Every containerized service in the fixed catalog, in reconcile order.
pub fn containerized_services() -> Vec<ServiceDef> {
    vec![python_backend_def(), n8n_def(), comfyui_def()]
}

/// Every supervised service, containerized plus the native binary
/// pseudo-service -- the set the `Watchdog` is constructed with.
pub fn all_services(native_llm_port: u16) -> Vec<ServiceDef> {
    let mut services = containerized_services();
    services.push(native_llm_def(native_llm_port));
    services
}
