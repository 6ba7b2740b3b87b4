// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[test]
fn parse_response_line_skips_non_json_log_lines() {
    assert!(parse_response_line("server listening on stdio").is_none());
    assert!(parse_response_line("").is_none());
}

#[test]
fn parse_response_line_extracts_result() {
    let line = r#"{"jsonrpc":"2.0","id":"call-1","result":{"content":[{"type":"text","text":"ok"}]}}"#;
    let parsed = parse_response_line(line).unwrap();
    assert_eq!(parsed.id, "call-1");
    assert!(parsed.outcome.is_ok());
}

#[test]
fn parse_response_line_extracts_error_message() {
    let line = r#"{"jsonrpc":"2.0","id":"call-2","error":{"code":-32000,"message":"boom"}}"#;
    let parsed = parse_response_line(line).unwrap();
    assert_eq!(parsed.id, "call-2");
    assert_eq!(parsed.outcome.unwrap_err(), "boom");
}

#[test]
fn parse_response_line_accepts_numeric_id() {
    let line = r#"{"jsonrpc":"2.0","id":7,"result":null}"#;
    let parsed = parse_response_line(line).unwrap();
    assert_eq!(parsed.id, "7");
}

#[test]
fn parse_response_line_ignores_ids_of_wrong_type() {
    let line = r#"{"jsonrpc":"2.0","id":null,"result":{}}"#;
    assert!(parse_response_line(line).is_none());
}

#[test]
fn build_request_line_includes_params_and_trailing_newline() {
    let line = build_request_line("c1", "tools/call", Some(serde_json::json!({"name": "read"})));
    assert!(line.ends_with('\n'));
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(value["id"], "c1");
    assert_eq!(value["method"], "tools/call");
    assert_eq!(value["params"]["name"], "read");
}

#[test]
fn build_request_line_omits_params_field_when_absent() {
    let line = build_request_line("c2", "tools/list", None);
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert!(value.get("params").is_none());
}

#[tokio::test]
async fn pending_requests_resolves_registered_waiter_exactly_once() {
    let pending = PendingRequests::new();
    let rx = pending.register("a");
    assert_eq!(pending.len(), 1);

    assert!(pending.resolve("a", Ok(serde_json::json!("done"))));
    assert_eq!(pending.len(), 0);
    assert_eq!(rx.await.unwrap().unwrap(), serde_json::json!("done"));

    // Resolving again (e.g. a duplicate line with the same id) is a no-op.
    assert!(!pending.resolve("a", Ok(serde_json::Value::Null)));
}

#[tokio::test]
async fn pending_requests_fail_all_drains_every_waiter() {
    let pending = PendingRequests::new();
    let rx1 = pending.register("a");
    let rx2 = pending.register("b");

    pending.fail_all("process exited");

    assert!(pending.is_empty());
    assert_eq!(rx1.await.unwrap().unwrap_err(), "process exited");
    assert_eq!(rx2.await.unwrap().unwrap_err(), "process exited");
}

#[test]
fn pending_requests_forget_removes_without_resolving() {
    let pending = PendingRequests::new();
    let _rx = pending.register("a");
    pending.forget("a");
    assert!(pending.is_empty());
    assert!(!pending.resolve("a", Ok(serde_json::Value::Null)));
}
