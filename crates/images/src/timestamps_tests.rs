// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

#![cfg(feature = "test-support")]

use super::*;

#[tokio::test]
async fn seeded_timestamp_is_retrievable() {
    let store = FakePullTimestampStore::new();
    store.seed("clara/ollama:latest", 1_000);
    assert_eq!(store.last_pulled_at_ms("clara/ollama:latest").await, Some(1_000));
}

#[tokio::test]
async fn record_pulled_overwrites_previous_value() {
    let store = FakePullTimestampStore::new();
    store.record_pulled("clara/ollama:latest", 1_000).await;
    store.record_pulled("clara/ollama:latest", 2_000).await;
    assert_eq!(store.last_pulled_at_ms("clara/ollama:latest").await, Some(2_000));
}

#[tokio::test]
async fn unknown_image_has_no_timestamp() {
    let store = FakePullTimestampStore::new();
    assert_eq!(store.last_pulled_at_ms("ghost:latest").await, None);
}
