// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use crate::timestamps::FakePullTimestampStore;
use clara_core::{EngineCandidate, EngineEndpoint, FakeClock};
use clara_engine::{FakeEngineHandle, PullEvent};
use std::sync::Arc;

fn puller_with_script(script: Vec<Result<PullEvent, String>>) -> Puller<FakeClock> {
    let engine = Arc::new(FakeEngineHandle::new(EngineCandidate {
        endpoint: EngineEndpoint::DefaultEnv,
        priority: 0,
        discovery_index: 0,
        kind: "fake".to_string(),
    }));
    engine.set_pull_script(script);
    Puller::new(engine, Arc::new(FakePullTimestampStore::new()), FakeClock::new())
}

#[tokio::test]
async fn classifies_update_available_when_downloading_seen() {
    let puller = puller_with_script(vec![Ok(PullEvent {
        layer_id: "l1".to_string(),
        status: "Downloading".to_string(),
        current: 1,
        total: Some(2),
    })]);
    let checker = UpdateChecker::new(&puller);
    let outcome = checker.check("clara/ollama", "latest", Arch::Amd64).await;
    assert_eq!(outcome, UpdateCheckOutcome::UpdateAvailable);
}

#[tokio::test]
async fn classifies_up_to_date_when_status_says_so() {
    let puller = puller_with_script(vec![Ok(PullEvent {
        layer_id: "l1".to_string(),
        status: "Status: Image is up to date".to_string(),
        current: 0,
        total: Some(0),
    })]);
    let checker = UpdateChecker::new(&puller);
    let outcome = checker.check("clara/ollama", "latest", Arch::Amd64).await;
    assert_eq!(outcome, UpdateCheckOutcome::UpToDate);
}

#[tokio::test]
async fn classifies_check_failed_when_both_attempts_error() {
    let puller = puller_with_script(vec![Err("manifest unknown".to_string())]);
    let checker = UpdateChecker::new(&puller);
    let outcome = checker.check("clara/ollama", "latest", Arch::Amd64).await;
    assert_eq!(outcome, UpdateCheckOutcome::CheckFailed);
}
