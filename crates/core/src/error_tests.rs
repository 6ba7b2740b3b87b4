// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[test]
fn user_message_includes_key_for_service_errors() {
    let err = ClaraError::transient("n8n", "health probe failed");
    assert!(err.user_message().contains("n8n"));
    assert!(err.user_message().contains("health probe failed"));
}

#[test]
fn concurrency_guard_round_trips_through_json() {
    let err = ClaraError::concurrency_guard("update already in progress");
    let json = serde_json::to_string(&err).unwrap();
    let back: ClaraError = serde_json::from_str(&json).unwrap();
    assert_eq!(err.user_message(), back.user_message());
}
