// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use clara_core::EngineEndpoint;

fn candidate_with(endpoint: EngineEndpoint) -> EngineCandidate {
    EngineCandidate { endpoint, priority: 0, discovery_index: 0, kind: "test".to_string() }
}

#[test]
fn unix_socket_translates_to_docker_host_url() {
    let candidate = candidate_with(EngineEndpoint::UnixSocket { path: "/var/run/docker.sock".into() });
    let env = endpoint_env(&candidate);
    assert_eq!(env, vec![("DOCKER_HOST".to_string(), "unix:///var/run/docker.sock".to_string())]);
}

#[test]
fn tcp_without_tls_uses_tcp_scheme() {
    let candidate =
        candidate_with(EngineEndpoint::Tcp { host: "1.2.3.4".to_string(), port: 2375, tls: false, cert_dir: None });
    let env = endpoint_env(&candidate);
    assert_eq!(env, vec![("DOCKER_HOST".to_string(), "tcp://1.2.3.4:2375".to_string())]);
}

#[test]
fn tcp_with_tls_uses_https_scheme() {
    let candidate =
        candidate_with(EngineEndpoint::Tcp { host: "1.2.3.4".to_string(), port: 2376, tls: true, cert_dir: None });
    let env = endpoint_env(&candidate);
    assert_eq!(env, vec![("DOCKER_HOST".to_string(), "https://1.2.3.4:2376".to_string())]);
}

#[test]
fn cli_context_sets_docker_context_env() {
    let candidate = candidate_with(EngineEndpoint::CliContext {
        name: "desktop-linux".to_string(),
        endpoint: "unix:///run/desktop.sock".to_string(),
    });
    let env = endpoint_env(&candidate);
    assert_eq!(env, vec![("DOCKER_CONTEXT".to_string(), "desktop-linux".to_string())]);
}

#[test]
fn default_env_sets_no_overrides() {
    let candidate = candidate_with(EngineEndpoint::DefaultEnv);
    assert!(endpoint_env(&candidate).is_empty());
}

#[tokio::test]
async fn locate_returns_diagnostics_even_on_total_failure() {
    // In a sandbox with no reachable docker socket, every candidate should
    // fail the ping and the error must still carry a full attempt log.
    let locator = ContainerEngineLocator::new();
    match locator.locate().await {
        Ok(_) => {
            // A real docker daemon happened to be reachable in this
            // environment; nothing further to assert.
        }
        Err(unavailable) => {
            assert!(unavailable.attempted > 0);
            assert_eq!(unavailable.attempted, unavailable.diagnostics.attempts.len());
            assert!(unavailable.diagnostics.successful_candidate().is_none());
        }
    }
}
