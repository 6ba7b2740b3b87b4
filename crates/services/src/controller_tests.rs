// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use crate::health::FakeProcessLivenessProbe;
use clara_core::{FakeClock, HealthPredicateId, RestartPolicy, RuntimeHint};
use clara_engine::{EngineCandidate, EngineEndpoint, FakeEngineHandle};
use clara_images::FakePullTimestampStore;
use std::collections::HashSet;

fn candidate() -> EngineCandidate {
    EngineCandidate { endpoint: EngineEndpoint::DefaultEnv, priority: 0, discovery_index: 0, kind: "fake".into() }
}

fn def_with_predicate(predicate: HealthPredicateId) -> ServiceDef {
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
        platform_gate: HashSet::from([Os::Linux, Os::Darwin, Os::Windows]),
    }
}

fn make_controller(
    engine: Arc<FakeEngineHandle>,
) -> (ServiceController<FakeClock>, broadcast::Receiver<Event>) {
    let timestamps = Arc::new(FakePullTimestampStore::new());
    let puller = Arc::new(Puller::new(engine.clone(), timestamps, FakeClock::new()));
    let (tx, rx) = broadcast::channel(16);
    (ServiceController::new(engine, puller, tx), rx)
}

#[tokio::test(start_paused = true)]
async fn reconcile_creates_starts_and_reports_healthy_container_running_service() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    engine.mark_image_local("clara/demo:latest");
    let (controller, mut events) = make_controller(engine.clone());

    let def = def_with_predicate(HealthPredicateId::ContainerRunning);
    let health_ctx =
        HealthContext { engine: engine.clone(), http_client: reqwest::Client::new(), process_probe: Arc::new(FakeProcessLivenessProbe::new()) };

    controller.reconcile_one(&def, Os::Linux, "clara-net", &health_ctx).await.unwrap();

    assert_eq!(engine.container_count(), 1);
    let event = events.recv().await.unwrap();
    assert!(matches!(event, Event::ServiceState { status, .. } if status == "healthy"));
}

#[tokio::test]
async fn reconcile_skips_platform_excluded_service() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let (controller, _events) = make_controller(engine.clone());

    let mut def = def_with_predicate(HealthPredicateId::ContainerRunning);
    def.platform_gate = HashSet::from([Os::Windows]);

    controller.reconcile_one(&def, Os::Linux, "clara-net", &HealthContext {
        engine: engine.clone(),
        http_client: reqwest::Client::new(),
        process_probe: Arc::new(FakeProcessLivenessProbe::new()),
    }).await.unwrap();

    assert_eq!(engine.container_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn reconcile_reports_startup_failure_when_never_healthy() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    engine.mark_image_local("clara/demo:latest");
    let (controller, mut events) = make_controller(engine.clone());

    // Process-alive/port-open predicate that can never pass since no fake
    // process is ever marked alive.
    let def = def_with_predicate(HealthPredicateId::ProcessAlivePortOpen { port: 1 });
    let health_ctx = HealthContext {
        engine: engine.clone(),
        http_client: reqwest::Client::new(),
        process_probe: Arc::new(FakeProcessLivenessProbe::new()),
    };

    let result = controller.reconcile_one(&def, Os::Linux, "clara-net", &health_ctx).await;
    assert!(matches!(result, Err(ServiceError::StartupFailure { .. })));

    let mut saw_failed = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, Event::ServiceState { status, .. } if status == "failed") {
            saw_failed = true;
        }
    }
    assert!(saw_failed);
}

#[tokio::test]
async fn gpu_capability_is_cached_after_first_probe() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    engine.set_gpu_available(true);
    let (controller, _events) = make_controller(engine.clone());

    assert!(controller.gpu_capability().await);
    engine.set_gpu_available(false);
    // Still true: cached from the first probe.
    assert!(controller.gpu_capability().await);

    controller.reset_gpu_cache();
    assert!(!controller.gpu_capability().await);
}

#[tokio::test]
async fn ensure_volumes_creates_every_named_volume_once() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let (controller, _events) = make_controller(engine.clone());

    let mut def = def_with_predicate(HealthPredicateId::ContainerRunning);
    def.named_volumes = vec![clara_core::NamedVolumeMount {
        volume_name: "clara-demo-data".to_string(),
        container_path: "/data".to_string(),
    }];

    controller.ensure_volumes(&[def]).await.unwrap();
}
