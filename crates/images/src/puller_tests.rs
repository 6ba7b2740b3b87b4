// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use crate::timestamps::FakePullTimestampStore;
use clara_core::{EngineCandidate, EngineEndpoint, FakeClock};
use clara_engine::FakeEngineHandle;

fn fake_engine() -> Arc<FakeEngineHandle> {
    Arc::new(FakeEngineHandle::new(EngineCandidate {
        endpoint: EngineEndpoint::DefaultEnv,
        priority: 0,
        discovery_index: 0,
        kind: "fake".to_string(),
    }))
}

#[tokio::test]
async fn should_pull_is_false_within_freshness_window() {
    let clock = FakeClock::new();
    let timestamps = Arc::new(FakePullTimestampStore::new());
    timestamps.seed("clara/ollama:latest", clock.epoch_ms());
    let puller = Puller::new(fake_engine(), timestamps, clock);

    assert!(!puller.should_pull("clara/ollama:latest", false).await);
}

#[tokio::test]
async fn should_pull_is_true_when_forced() {
    let clock = FakeClock::new();
    let timestamps = Arc::new(FakePullTimestampStore::new());
    timestamps.seed("clara/ollama:latest", clock.epoch_ms());
    let puller = Puller::new(fake_engine(), timestamps, clock);

    assert!(puller.should_pull("clara/ollama:latest", true).await);
}

#[tokio::test]
async fn should_pull_is_true_with_no_prior_record() {
    let clock = FakeClock::new();
    let timestamps = Arc::new(FakePullTimestampStore::new());
    let puller = Puller::new(fake_engine(), timestamps, clock);

    assert!(puller.should_pull("clara/ollama:latest", false).await);
}

#[tokio::test]
async fn pull_stream_aggregates_layer_progress_into_percentage() {
    use clara_engine::PullEvent;

    let clock = FakeClock::new();
    let timestamps = Arc::new(FakePullTimestampStore::new());
    let engine = fake_engine();
    engine.set_pull_script(vec![
        Ok(PullEvent { layer_id: "l1".to_string(), status: "Downloading".to_string(), current: 50, total: Some(100) }),
        Ok(PullEvent { layer_id: "l2".to_string(), status: "Downloading".to_string(), current: 25, total: Some(100) }),
        Ok(PullEvent { layer_id: "l1".to_string(), status: "Pull complete".to_string(), current: 100, total: Some(100) }),
        Ok(PullEvent { layer_id: "l2".to_string(), status: "Pull complete".to_string(), current: 100, total: Some(100) }),
    ]);

    let puller = Puller::new(engine, timestamps.clone(), clock);
    let mut stream = puller.pull_stream("clara/ollama:latest").await.unwrap();

    let mut last_percentage = 0.0;
    while let Some(event) = stream.next().await {
        last_percentage = event.unwrap().percentage;
    }
    assert_eq!(last_percentage, 100.0);
    assert!(timestamps.last_pulled_at_ms("clara/ollama:latest").await.is_some());
}

#[tokio::test]
async fn pull_stream_marks_first_run_in_status_text() {
    use clara_engine::PullEvent;

    let clock = FakeClock::new();
    let timestamps = Arc::new(FakePullTimestampStore::new());
    let engine = fake_engine();
    engine.set_pull_script(vec![Ok(PullEvent {
        layer_id: "l1".to_string(),
        status: "Downloading".to_string(),
        current: 1,
        total: Some(1),
    })]);

    let puller = Puller::new(engine, timestamps, clock);
    let mut stream = puller.pull_stream("clara/ollama:latest").await.unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert!(first.status_text.contains("first pull"));
}

#[tokio::test]
async fn pull_stream_propagates_engine_error() {
    let clock = FakeClock::new();
    let timestamps = Arc::new(FakePullTimestampStore::new());
    let engine = fake_engine();
    engine.set_pull_script(vec![Err("layer corrupted".to_string())]);

    let puller = Puller::new(engine, timestamps, clock);
    let mut stream = puller.pull_stream("clara/ollama:latest").await.unwrap();
    let result = stream.next().await.unwrap();
    assert!(result.is_err());
}
