// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Remote MCP server support: a single GET liveness probe (no long-lived
//! connection) and JSON-RPC-over-POST tool calls (spec §4.G).

use crate::runtime::McpRuntimeError;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

fn apply_headers(
    mut builder: reqwest::RequestBuilder,
    headers: &HashMap<String, String>,
) -> reqwest::RequestBuilder {
    for (key, value) in headers {
        builder = builder.header(key, value);
    }
    builder
}

/// Single GET probe against `url`; a non-2xx response or a connection
/// failure counts as unreachable.
pub async fn probe(
    client: &reqwest::Client,
    url: &str,
    headers: &HashMap<String, String>,
) -> Result<(), McpRuntimeError> {
    let request = apply_headers(client.get(url), headers).timeout(PROBE_TIMEOUT);
    let response = request
        .send()
        .await
        .map_err(|e| McpRuntimeError::Http(url.to_string(), e.to_string()))?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(McpRuntimeError::Http(url.to_string(), format!("status {}", response.status())))
    }
}

/// POSTs a JSON-RPC envelope to `url` and parses the response the same way
/// a stdio line is parsed: `result` on success, `error.message` on failure.
pub async fn call_tool(
    client: &reqwest::Client,
    url: &str,
    headers: &HashMap<String, String>,
    call_id: &str,
    method: &str,
    params: Option<Value>,
    timeout: Duration,
) -> Result<Value, McpRuntimeError> {
    let mut envelope = serde_json::json!({
        "jsonrpc": "2.0",
        "id": call_id,
        "method": method,
    });
    if let Some(params) = params {
        envelope["params"] = params;
    }

    let request = apply_headers(client.post(url), headers).json(&envelope).timeout(timeout);
    let response = request
        .send()
        .await
        .map_err(|e| McpRuntimeError::Http(url.to_string(), e.to_string()))?;

    if !response.status().is_success() {
        return Err(McpRuntimeError::Http(url.to_string(), format!("status {}", response.status())));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| McpRuntimeError::Http(url.to_string(), e.to_string()))?;

    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(McpRuntimeError::ServerError(url.to_string(), message));
    }
    Ok(body.get("result").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
