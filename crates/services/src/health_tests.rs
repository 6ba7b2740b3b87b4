// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use clara_core::{RestartPolicy, RuntimeHint, ServiceKey};
use clara_engine::{ContainerSpec, EngineCandidate, FakeEngineHandle};
use std::collections::{HashMap, HashSet};

fn service_def(predicate: HealthPredicateId) -> ServiceDef {
    ServiceDef {
        key: ServiceKey::from("demo"),
        container_name: "clara-demo".to_string(),
        image_ref: "clara/demo:latest".to_string(),
        host_port: 8090,
        container_port: 80,
        bind_mounts: Vec::new(),
        named_volumes: Vec::new(),
        env: Vec::new(),
        runtime_hint: RuntimeHint::Default,
        restart_policy: RestartPolicy::Always,
        health_predicate_id: predicate,
        platform_gate: HashSet::new(),
    }
}

fn fake_ctx(engine: Arc<FakeEngineHandle>, probe: Arc<FakeProcessLivenessProbe>) -> HealthContext {
    HealthContext { engine, http_client: reqwest::Client::new(), process_probe: probe }
}

fn candidate() -> EngineCandidate {
    EngineCandidate { endpoint: clara_core::EngineEndpoint::DefaultEnv, priority: 0, discovery_index: 0, kind: "fake".into() }
}

#[tokio::test]
async fn container_running_predicate_true_when_engine_reports_running() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let spec = ContainerSpec {
        name: "clara-demo".to_string(),
        image: "clara/demo:latest".to_string(),
        env: HashMap::new(),
        ports: Vec::new(),
        bind_mounts: Vec::new(),
        named_volumes: Vec::new(),
        network: None,
        gpu: false,
        command: None,
        labels: HashMap::new(),
    };
    engine.create_container(&spec).await.unwrap();
    engine.start_container("clara-demo").await.unwrap();

    let ctx = fake_ctx(engine, Arc::new(FakeProcessLivenessProbe::new()));
    let service = service_def(HealthPredicateId::ContainerRunning);
    assert!(check_health(&ctx, &service, &service.health_predicate_id).await.unwrap());
}

#[tokio::test]
async fn container_running_predicate_false_when_missing() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let ctx = fake_ctx(engine, Arc::new(FakeProcessLivenessProbe::new()));
    let service = service_def(HealthPredicateId::ContainerRunning);
    assert!(!check_health(&ctx, &service, &service.health_predicate_id).await.unwrap());
}

#[tokio::test]
async fn process_alive_port_open_false_when_process_dead() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let probe = Arc::new(FakeProcessLivenessProbe::new());
    let ctx = fake_ctx(engine, probe);
    let service = service_def(HealthPredicateId::ProcessAlivePortOpen { port: 58341 });
    assert!(!check_health(&ctx, &service, &service.health_predicate_id).await.unwrap());
}

#[tokio::test]
async fn process_alive_port_open_false_when_alive_but_port_closed() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let probe = Arc::new(FakeProcessLivenessProbe::new());
    probe.set_alive(&ServiceKey::from("demo"), true);
    let ctx = fake_ctx(engine, probe);
    // Port 1 is privileged/unused in test sandboxes; connect should fail fast.
    let service = service_def(HealthPredicateId::ProcessAlivePortOpen { port: 1 });
    let result = check_health(&ctx, &service, &service.health_predicate_id).await;
    assert_eq!(result.unwrap_or(false), false);
}
