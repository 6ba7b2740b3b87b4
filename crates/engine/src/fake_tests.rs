// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use crate::handle::{ContainerSpec, PortBinding};
use clara_core::EngineEndpoint;
use std::collections::HashMap;

fn candidate() -> EngineCandidate {
    EngineCandidate { endpoint: EngineEndpoint::DefaultEnv, priority: 60, discovery_index: 0, kind: "fake".to_string() }
}

fn spec(name: &str) -> ContainerSpec {
    ContainerSpec {
        name: name.to_string(),
        image: "clara/demo:latest".to_string(),
        env: HashMap::new(),
        ports: vec![PortBinding { host_port: 8080, container_port: 80, protocol: "tcp".to_string() }],
        bind_mounts: Vec::new(),
        named_volumes: Vec::new(),
        network: None,
        gpu: false,
        command: None,
        labels: HashMap::new(),
    }
}

#[tokio::test]
async fn create_start_stop_remove_lifecycle() {
    let handle = FakeEngineHandle::new(candidate());
    handle.create_container(&spec("demo")).await.unwrap();
    assert_eq!(handle.container_count(), 1);

    handle.start_container("demo").await.unwrap();
    let info = handle.inspect_container("demo").await.unwrap().unwrap();
    assert!(matches!(info.state, ContainerState::Running));

    handle.stop_container("demo", 5).await.unwrap();
    let info = handle.inspect_container("demo").await.unwrap().unwrap();
    assert!(matches!(info.state, ContainerState::Exited { code: 0 }));

    handle.remove_container("demo", false).await.unwrap();
    assert_eq!(handle.container_count(), 0);
}

#[tokio::test]
async fn start_missing_container_is_not_found() {
    let handle = FakeEngineHandle::new(candidate());
    let result = handle.start_container("ghost").await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn unreachable_engine_fails_ping() {
    let handle = FakeEngineHandle::new(candidate());
    handle.set_reachable(false);
    assert!(handle.ping().await.is_err());
}

#[tokio::test]
async fn pull_script_replays_as_stream() {
    use crate::handle::PullEvent;
    use futures_util::StreamExt;

    let handle = FakeEngineHandle::new(candidate());
    handle.set_pull_script(vec![
        Ok(PullEvent { layer_id: "l1".to_string(), status: "Downloading".to_string(), current: 50, total: Some(100) }),
        Ok(PullEvent { layer_id: "l1".to_string(), status: "Pull complete".to_string(), current: 100, total: Some(100) }),
    ]);

    let events: Vec<_> = handle.pull_image("clara/demo:latest").await.unwrap().collect().await;
    assert_eq!(events.len(), 2);
    assert!(events[1].as_ref().unwrap().status == "Pull complete");
}

#[tokio::test]
async fn image_presence_checks_reflect_markings() {
    let handle = FakeEngineHandle::new(candidate());
    assert!(!handle.image_exists_locally("clara/demo:latest").await.unwrap());
    handle.mark_image_local("clara/demo:latest");
    assert!(handle.image_exists_locally("clara/demo:latest").await.unwrap());

    assert!(!handle.remote_manifest_exists("clara/demo:latest-amd64").await.unwrap());
    handle.mark_remote_manifest("clara/demo:latest-amd64");
    assert!(handle.remote_manifest_exists("clara/demo:latest-amd64").await.unwrap());
}

#[tokio::test]
async fn ensure_network_and_volume_are_idempotent() {
    let handle = FakeEngineHandle::new(candidate());
    handle.ensure_network("clara-net").await.unwrap();
    handle.ensure_network("clara-net").await.unwrap();
    handle.ensure_volume("clara-vol").await.unwrap();
    handle.ensure_volume("clara-vol").await.unwrap();
}
