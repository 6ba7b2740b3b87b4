// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! JSON-RPC 2.0 request/response correlation over a line-oriented stdout
//! stream (spec §4.G). Malformed or unrelated lines are skipped without
//! disturbing in-flight calls; every registered waiter is resolved exactly
//! once, either by a matching response, a timeout, or a process exit.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::oneshot;

pub type ToolResult = Result<Value, String>;

/// Table of in-flight JSON-RPC calls awaiting a response, keyed by the
/// caller-supplied correlation id.
#[derive(Default)]
pub struct PendingRequests {
    waiters: Mutex<HashMap<String, oneshot::Sender<ToolResult>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, call_id: &str) -> oneshot::Receiver<ToolResult> {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().insert(call_id.to_string(), tx);
        rx
    }

    /// Resolves the waiter for `call_id`, if any is still pending. Returns
    /// `false` if no waiter was registered under this id (e.g. already timed
    /// out or a response for an id nobody is waiting on).
    pub fn resolve(&self, call_id: &str, result: ToolResult) -> bool {
        match self.waiters.lock().remove(call_id) {
            Some(tx) => {
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    /// Removes and drops the waiter for `call_id` without resolving it
    /// (used when a tool-call timeout expires — the process keeps running).
    pub fn forget(&self, call_id: &str) {
        self.waiters.lock().remove(call_id);
    }

    /// Fails every outstanding waiter with `reason` (process exit).
    pub fn fail_all(&self, reason: &str) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        for (_, tx) in waiters {
            let _ = tx.send(Err(reason.to_string()));
        }
    }

    pub fn len(&self) -> usize {
        self.waiters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed JSON-RPC response line: the id it correlates to, plus the
/// extracted result or error message.
pub struct ParsedResponse {
    pub id: String,
    pub outcome: ToolResult,
}

/// Parses one line of MCP server stdout. Lines that don't start with `{` or
/// `[`, or that fail to parse as JSON, or that carry no `id`, are skipped
/// (returns `None`) rather than treated as a correlation failure — servers
/// routinely interleave log lines with their JSON-RPC frames.
pub fn parse_response_line(line: &str) -> Option<ParsedResponse> {
    let trimmed = line.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    let id = match value.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let outcome = if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        Err(message)
    } else {
        Ok(value.get("result").cloned().unwrap_or(Value::Null))
    };
    Some(ParsedResponse { id, outcome })
}

/// Builds the JSON-RPC 2.0 request envelope for a `tools/call` or
/// `tools/list` invocation, terminated with a trailing newline as required
/// by the line-framed stdio transport.
pub fn build_request_line(call_id: &str, method: &str, params: Option<Value>) -> String {
    let mut request = serde_json::json!({
        "jsonrpc": "2.0",
        "id": call_id,
        "method": method,
    });
    if let Some(params) = params {
        request["params"] = params;
    }
    format!("{request}\n")
}

#[cfg(test)]
#[path = "correlation_tests.rs"]
mod tests;
