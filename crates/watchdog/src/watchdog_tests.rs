// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use crate::notify::FakeNotifySink;
use crate::restart::FakeRestarter;
use clara_core::{FakeClock, HealthPredicateId, Os, RestartPolicy, RuntimeHint};
use clara_engine::{EngineCandidate, EngineEndpoint, FakeEngineHandle};
use clara_services::health::FakeProcessLivenessProbe;
use std::collections::HashSet;

fn candidate() -> EngineCandidate {
    EngineCandidate { endpoint: EngineEndpoint::DefaultEnv, priority: 0, discovery_index: 0, kind: "fake".into() }
}

fn def(key: &str, platform_gate: HashSet<Os>) -> ServiceDef {
    ServiceDef {
        key: ServiceKey::from(key),
        container_name: format!("clara-{key}"),
        image_ref: "clara/demo:latest".to_string(),
        host_port: 8099,
        container_port: 80,
        bind_mounts: Vec::new(),
        named_volumes: Vec::new(),
        env: Vec::new(),
        runtime_hint: RuntimeHint::Default,
        restart_policy: RestartPolicy::Always,
        health_predicate_id: HealthPredicateId::ContainerRunning,
        platform_gate,
    }
}

fn test_params() -> WatchdogParams {
    WatchdogParams {
        check_interval: Duration::from_secs(30),
        startup_grace: Duration::from_secs(60),
        max_retries: 3,
        retry_delay: Duration::from_secs(10),
        max_notifications: 3,
        post_restart_wait: Duration::from_secs(15),
    }
}

fn all_platforms() -> HashSet<Os> {
    HashSet::from([Os::Linux, Os::Darwin, Os::Windows])
}

fn make_watchdog(
    services: Vec<ServiceDef>,
    engine: Arc<FakeEngineHandle>,
    restarter: Arc<FakeRestarter>,
) -> (Arc<Watchdog<FakeClock>>, broadcast::Receiver<Event>) {
    let (tx, rx) = broadcast::channel(256);
    let health_ctx = HealthContext {
        engine: engine.clone(),
        http_client: reqwest::Client::new(),
        process_probe: Arc::new(FakeProcessLivenessProbe::new()),
    };
    let watchdog = Watchdog::new(
        services,
        Os::Linux,
        test_params(),
        health_ctx,
        restarter,
        Arc::new(FakeNotifySink::new()),
        tx,
        FakeClock::new(),
    );
    (Arc::new(watchdog), rx)
}

#[tokio::test(start_paused = true)]
async fn platform_excluded_service_is_disabled_and_never_ticked() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let gate = HashSet::from([Os::Darwin]); // excludes Linux
    let service = def("comfyui", gate);
    let (watchdog, _rx) = make_watchdog(vec![service.clone()], engine.clone(), Arc::new(FakeRestarter::new()));

    Watchdog::arm(&watchdog);
    assert_eq!(watchdog.service_state(&service.key).unwrap().status, ServiceStatus::Disabled);

    Watchdog::tick(watchdog.clone()).await;
    Watchdog::tick(watchdog.clone()).await;

    // tick() never evaluates an excluded service, so its status is frozen
    // at `disabled` regardless of how many ticks run.
    assert_eq!(watchdog.service_state(&service.key).unwrap().status, ServiceStatus::Disabled);
}

#[tokio::test(start_paused = true)]
async fn healthy_container_service_reports_healthy() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    engine.mark_image_local("clara/demo:latest");
    let service = def("n8n", all_platforms());
    engine.seed_running_container(&service.container_name);

    let (watchdog, mut rx) = make_watchdog(vec![service.clone()], engine.clone(), Arc::new(FakeRestarter::new()));

    Watchdog::tick(watchdog.clone()).await;

    let state = watchdog.service_state(&service.key).unwrap();
    assert_eq!(state.status, ServiceStatus::Healthy);
    assert_eq!(state.consecutive_failures, 0);

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::ServiceState { status, .. } if status == "healthy"));
}

#[tokio::test(start_paused = true)]
async fn unhealthy_service_triggers_single_flight_restart_that_restores_health() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let service = def("n8n", all_platforms());
    // no running container seeded: ContainerRunning predicate fails.

    let restarter = Arc::new(FakeRestarter::new());
    let (watchdog, mut rx) = make_watchdog(vec![service.clone()], engine.clone(), restarter.clone());

    Watchdog::tick(watchdog.clone()).await;
    let state = watchdog.service_state(&service.key).unwrap();
    assert_eq!(state.consecutive_failures, 1);
    assert!(state.recovering);

    // A second tick while recovering still counts the failure but must not
    // launch a second restart task (single-flight, testable property 2).
    Watchdog::tick(watchdog.clone()).await;
    let state = watchdog.service_state(&service.key).unwrap();
    assert_eq!(state.consecutive_failures, 2);
    assert!(state.recovering);
    assert_eq!(watchdog.in_flight.lock().len(), 1);

    // Advance past retry_delay + post_restart_wait; container is "running"
    // for the post-restart recheck.
    engine.seed_running_container(&service.container_name);
    tokio::time::advance(Duration::from_secs(26)).await;
    tokio::task::yield_now().await;

    let final_state = watchdog.service_state(&service.key).unwrap();
    assert_eq!(final_state.status, ServiceStatus::Healthy);
    assert!(!final_state.recovering);
    assert_eq!(restarter.call_count("n8n"), 1);

    let mut saw_restarted = false;
    while let Ok(event) = rx.try_recv() {
        if let Event::WatchdogNotice { title, .. } = event {
            if title.contains("restarted") {
                saw_restarted = true;
            }
        }
    }
    assert!(saw_restarted);
}

#[tokio::test(start_paused = true)]
async fn notifications_are_throttled_but_failures_keep_counting() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let service = def("n8n", all_platforms());
    let restarter = Arc::new(FakeRestarter::new());
    restarter.set_outcome("n8n", Err("still down".to_string()));

    let (watchdog, mut rx) = make_watchdog(vec![service.clone()], engine.clone(), restarter);

    for _ in 0..6 {
        Watchdog::tick(watchdog.clone()).await;
        tokio::time::advance(Duration::from_secs(11)).await;
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
    }

    let state = watchdog.service_state(&service.key).unwrap();
    assert_eq!(state.status, ServiceStatus::Failed);

    let mut warnings = 0;
    while let Ok(event) = rx.try_recv() {
        if let Event::WatchdogNotice { title, level, .. } = event {
            if title.contains("unhealthy") && matches!(level, EventLevel::Warning) {
                warnings += 1;
            }
        }
    }
    assert!(warnings <= 3, "expected at most max_notifications warnings, got {warnings}");
}

#[tokio::test(start_paused = true)]
async fn reset_failure_counts_unsticks_a_failed_service() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let service = def("n8n", all_platforms());
    let (watchdog, _rx) = make_watchdog(vec![service.clone()], engine.clone(), Arc::new(FakeRestarter::new()));

    {
        let mut state = watchdog.state.lock();
        state.insert(
            service.key.clone(),
            ServiceState { status: ServiceStatus::Failed, consecutive_failures: 9, last_check_at_ms: None, recovering: false },
        );
    }

    watchdog.reset_failure_counts();
    let state = watchdog.service_state(&service.key).unwrap();
    assert_eq!(state.status, ServiceStatus::Unknown);
    assert_eq!(state.consecutive_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn overall_health_aggregates_supervised_services() {
    let engine = Arc::new(FakeEngineHandle::new(candidate()));
    let a = def("a", all_platforms());
    let b = def("b", all_platforms());
    engine.seed_running_container(&a.container_name);
    // b has no running container -> unhealthy

    let (watchdog, _rx) = make_watchdog(vec![a.clone(), b.clone()], engine.clone(), Arc::new(FakeRestarter::new()));
    Watchdog::tick(watchdog.clone()).await;

    assert_eq!(watchdog.overall_health(), OverallHealth::Degraded);
}
