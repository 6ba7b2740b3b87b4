// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Candidate enumeration for container-engine discovery (spec §4.B).
//!
//! Candidates come from six sources: well-known socket paths, TCP endpoints
//! (from environment variables), CLI-reported contexts, "machine" endpoints,
//! alternative runtime sockets, and a running-process hint. Each is assigned
//! a priority per the spec's table (lower is better); ties break on
//! discovery order.

use clara_core::{EngineCandidate, EngineEndpoint};
use std::path::PathBuf;

/// Priority constants from spec §4.B's table.
pub mod priority {
    pub const WINDOWS_NAMED_PIPE: i32 = 0;
    pub const DESKTOP_USER_SOCKET: i32 = 1;
    pub const SYSTEM_SOCKET: i32 = 3;
    pub const WSL_SOCKET: i32 = 5;
    pub const ALT_RUNTIME_SOCKET: i32 = 8;
    pub const SNAP_FLATPAK_ROOTLESS: i32 = 14;
    pub const USER_PODMAN_SOCKET: i32 = 19;
    pub const WINDOWS_ALT_PIPE: i32 = 22;
    pub const CLI_CONTEXT: i32 = 25;
    pub const MACHINE: i32 = 30;
    pub const ALT_RUNTIME_GENERIC: i32 = 40;
    pub const TCP_FROM_ENV: i32 = 50;
    pub const PROCESS_DETECTED_DEFAULT: i32 = 60;
}

/// Enumerates all candidate endpoints worth probing on this host, in a
/// stable but not-yet-prioritized order (the locator sorts before probing).
pub fn enumerate_candidates(home_dir: Option<&PathBuf>) -> Vec<EngineCandidate> {
    let mut candidates = Vec::new();
    let mut idx = 0usize;
    let mut push = |endpoint: EngineEndpoint, priority: i32, kind: &str| {
        candidates.push(EngineCandidate { endpoint, priority, discovery_index: idx, kind: kind.to_string() });
        idx += 1;
    };

    if cfg!(target_os = "windows") {
        push(
            EngineEndpoint::NamedPipe { path: r"\\.\pipe\docker_engine".to_string() },
            priority::WINDOWS_NAMED_PIPE,
            "Docker Desktop",
        );
        push(
            EngineEndpoint::NamedPipe { path: r"\\.\pipe\podman-machine-default".to_string() },
            priority::WINDOWS_ALT_PIPE,
            "Podman Machine",
        );
    } else {
        if let Some(home) = home_dir {
            push(
                EngineEndpoint::UnixSocket {
                    path: home.join(".docker/run/docker.sock"),
                },
                priority::DESKTOP_USER_SOCKET,
                "Docker Desktop",
            );
            push(
                EngineEndpoint::UnixSocket {
                    path: home.join(".local/share/containers/podman/machine/podman.sock"),
                },
                priority::USER_PODMAN_SOCKET,
                "Podman",
            );
            push(
                EngineEndpoint::UnixSocket { path: home.join(".colima/default/docker.sock") },
                priority::ALT_RUNTIME_SOCKET,
                "Colima",
            );
        }
        push(
            EngineEndpoint::UnixSocket { path: PathBuf::from("/var/run/docker.sock") },
            priority::SYSTEM_SOCKET,
            "Docker Engine",
        );
        push(
            EngineEndpoint::UnixSocket { path: PathBuf::from("/run/podman/podman.sock") },
            priority::SYSTEM_SOCKET + 1,
            "Podman (system)",
        );
        push(
            EngineEndpoint::UnixSocket {
                path: PathBuf::from("/mnt/wsl/docker-desktop/docker.sock"),
            },
            priority::WSL_SOCKET,
            "Docker Desktop (WSL)",
        );
        push(
            EngineEndpoint::UnixSocket {
                path: PathBuf::from("/run/user/1000/podman/podman.sock"),
            },
            priority::SNAP_FLATPAK_ROOTLESS,
            "Podman (rootless)",
        );
    }

    if let Ok(host) = std::env::var("DOCKER_HOST") {
        if let Some((host_part, port_part)) = parse_tcp_host(&host) {
            push(
                EngineEndpoint::Tcp {
                    host: host_part,
                    port: port_part,
                    tls: std::env::var("DOCKER_TLS_VERIFY").map(|v| v == "1").unwrap_or(false),
                    cert_dir: std::env::var("DOCKER_CERT_PATH").ok().map(PathBuf::from),
                },
                priority::TCP_FROM_ENV,
                "TCP (DOCKER_HOST)",
            );
        }
    }

    push(EngineEndpoint::DefaultEnv, priority::PROCESS_DETECTED_DEFAULT, "Default environment");

    candidates
}

fn parse_tcp_host(docker_host: &str) -> Option<(String, u16)> {
    let without_scheme = docker_host.split("://").last()?;
    let mut parts = without_scheme.rsplitn(2, ':');
    let port: u16 = parts.next()?.parse().ok()?;
    let host = parts.next()?.to_string();
    Some((host, port))
}

#[cfg(test)]
#[path = "candidates_tests.rs"]
mod tests;
