// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The MCP registry + lifecycle supervisor (spec §4.G). Owns every
//! `McpServerDef` a user has registered, the active `McpRuntime`s for the
//! ones currently running, and dispatches tool calls to whichever transport
//! (stdio correlation table, or a one-shot remote POST) a server uses.

use crate::process::{self, ActiveMap};
use crate::registry::McpRegistryStore;
use crate::remote;
use crate::runtime::{McpRuntime, McpRuntimeError, Transport};
use crate::templates::mcp_templates;
use clara_core::{CallId, Clock, Event, McpRuntimeStatus, McpServerDef, McpServerName, McpServerType, McpTemplate, SystemClock};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

const TOOL_CALL_TIMEOUT: Duration = Duration::from_secs(30);
const TOOLS_LIST_TIMEOUT: Duration = Duration::from_secs(10);

pub type ToolCallOutcome = Result<Value, McpRuntimeError>;

pub struct McpSupervisor<C: Clock = SystemClock> {
    servers: Mutex<HashMap<McpServerName, McpServerDef>>,
    active: Arc<ActiveMap>,
    store: Arc<dyn McpRegistryStore>,
    http_client: reqwest::Client,
    events: broadcast::Sender<Event>,
    clock: C,
}

impl<C: Clock> McpSupervisor<C> {
    pub fn new(
        store: Arc<dyn McpRegistryStore>,
        http_client: reqwest::Client,
        events: broadcast::Sender<Event>,
        clock: C,
    ) -> Self {
        Self { servers: Mutex::new(HashMap::new()), active: Arc::new(Mutex::new(HashMap::new())), store, http_client, events, clock }
    }

    /// Re-reads the persisted registry, replacing the in-memory server
    /// table. Returns the `last_running_servers` list so the caller can
    /// decide whether/when to call [`Self::start_previously_running`].
    pub async fn load_registry(&self) -> Vec<McpServerName> {
        let (defs, last_running) = self.store.load().await;
        let mut servers = self.servers.lock();
        servers.clear();
        for def in defs {
            servers.insert(def.name.clone(), def);
        }
        last_running
    }

    pub fn templates(&self) -> &'static [McpTemplate] {
        mcp_templates()
    }

    pub fn list(&self) -> Vec<McpServerDef> {
        self.servers.lock().values().cloned().collect()
    }

    pub fn get(&self, name: &McpServerName) -> Option<McpServerDef> {
        self.servers.lock().get(name).cloned()
    }

    pub fn upsert(&self, def: McpServerDef) {
        self.servers.lock().insert(def.name.clone(), def);
    }

    pub fn remove(&self, name: &McpServerName) {
        self.servers.lock().remove(name);
    }

    pub fn status(&self, name: &McpServerName) -> Option<McpRuntimeStatus> {
        self.active.lock().get(name).map(|r| r.status())
    }

    /// Persists the current server table and the set of currently-running
    /// server names (spec §4.G / §4.I `mcp_config.json`). Intended to be
    /// called on daemon exit.
    pub async fn save_running_state(&self) {
        let defs: Vec<McpServerDef> = self.servers.lock().values().cloned().collect();
        let running: Vec<McpServerName> = self.active.lock().keys().cloned().collect();
        self.store.save(&defs, &running).await;
    }

    pub async fn start(&self, name: &McpServerName) -> Result<(), McpRuntimeError> {
        let def = self.get(name).ok_or_else(|| McpRuntimeError::NotRegistered(name.to_string()))?;
        if self.active.lock().contains_key(name) {
            return Ok(());
        }
        let started_at_ms = self.clock.epoch_ms();
        match def.server_type {
            McpServerType::Stdio => {
                process::spawn_stdio(&def, self.active.clone(), self.events.clone(), started_at_ms).await?;
            }
            McpServerType::Remote => {
                let url = def
                    .url
                    .clone()
                    .ok_or_else(|| McpRuntimeError::MissingUrl(name.to_string()))?;
                remote::probe(&self.http_client, &url, &def.headers).await?;
                let runtime = Arc::new(McpRuntime::new_remote(url, def.headers.clone(), started_at_ms));
                runtime.set_status(McpRuntimeStatus::Running);
                self.active.lock().insert(name.clone(), runtime);
                self.events
                    .send(Event::McpServerState {
                        name: name.to_string(),
                        status: "running".to_string(),
                        started_at_ms: Some(started_at_ms),
                        error: None,
                        pid: None,
                    })
                    .ok();
            }
        }
        Ok(())
    }

    /// Removes the runtime from the registry immediately (spec: "always
    /// delete the runtime immediately on request, no waiting"); for stdio
    /// servers the actual signal/kill sequence runs detached afterward.
    pub async fn stop(&self, name: &McpServerName) {
        let Some(runtime) = self.active.lock().remove(name) else { return };
        runtime.pending.fail_all("server stop requested");
        if runtime.is_stdio() {
            tokio::spawn(process::stop_stdio(runtime));
        }
        self.events
            .send(Event::McpServerState {
                name: name.to_string(),
                status: "stopped".to_string(),
                started_at_ms: None,
                error: None,
                pid: None,
            })
            .ok();
    }

    pub async fn stop_all(&self) {
        let names: Vec<McpServerName> = self.active.lock().keys().cloned().collect();
        for name in names {
            self.stop(&name).await;
        }
    }

    /// Starts every enabled server named in `last_running` (best-effort;
    /// failures are logged and skipped, not propagated).
    pub async fn start_previously_running(&self, last_running: &[McpServerName]) {
        for name in last_running {
            let Some(def) = self.get(name) else { continue };
            if !def.enabled {
                continue;
            }
            if let Err(e) = self.start(name).await {
                warn!(server = %name, error = %e, "failed to resume previously running mcp server");
            } else {
                info!(server = %name, "resumed previously running mcp server");
            }
        }
    }

    pub async fn start_all_enabled(&self) {
        let names: Vec<McpServerName> =
            self.servers.lock().values().filter(|d| d.enabled).map(|d| d.name.clone()).collect();
        for name in names {
            if let Err(e) = self.start(&name).await {
                warn!(server = %name, error = %e, "failed to start enabled mcp server");
            }
        }
    }

    pub async fn list_tools(&self, name: &McpServerName) -> ToolCallOutcome {
        self.dispatch(name, "tools/list", None, None, TOOLS_LIST_TIMEOUT).await
    }

    pub async fn call_tool(
        &self,
        name: &McpServerName,
        tool_name: &str,
        arguments: Value,
        call_id: CallId,
    ) -> ToolCallOutcome {
        let params = serde_json::json!({ "name": tool_name, "arguments": arguments });
        self.dispatch(name, "tools/call", Some(params), Some(call_id), TOOL_CALL_TIMEOUT).await
    }

    async fn dispatch(
        &self,
        name: &McpServerName,
        method: &str,
        params: Option<Value>,
        call_id: Option<CallId>,
        timeout: Duration,
    ) -> ToolCallOutcome {
        let runtime = self
            .active
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| McpRuntimeError::NotRunning(name.to_string()))?;
        let call_id = call_id.map(|c| c.to_string()).unwrap_or_else(|| method.to_string());

        match &runtime.transport {
            Transport::Stdio { .. } => self.dispatch_stdio(&runtime, &call_id, method, params, timeout).await,
            Transport::Remote { url, headers } => {
                remote::call_tool(&self.http_client, url, headers, &call_id, method, params, timeout).await
            }
        }
    }

    async fn dispatch_stdio(
        &self,
        runtime: &Arc<McpRuntime>,
        call_id: &str,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> ToolCallOutcome {
        let rx = runtime.pending.register(call_id);
        let line = crate::correlation::build_request_line(call_id, method, params);
        if let Err(e) = process::write_request_line(runtime, &line).await {
            runtime.pending.forget(call_id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => outcome.map_err(|msg| McpRuntimeError::ServerError(call_id.to_string(), msg)),
            Ok(Err(_)) => Err(McpRuntimeError::NotRunning(call_id.to_string())),
            Err(_) => {
                runtime.pending.forget(call_id);
                Err(McpRuntimeError::Timeout(call_id.to_string(), timeout))
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
