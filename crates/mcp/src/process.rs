// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Stdio MCP server process lifecycle: spawn, the stdout line reader that
//! drives JSON-RPC correlation, and the graceful-then-kill stop sequence
//! (spec §4.G).

use crate::correlation::parse_response_line;
use crate::path::{enhanced_path, resolve_command};
use crate::runtime::{McpRuntime, McpRuntimeError, Transport};
use clara_core::{Event, McpRuntimeStatus, McpServerDef, McpServerName};
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::broadcast;

pub type ActiveMap = SyncMutex<HashMap<McpServerName, Arc<McpRuntime>>>;

const STOP_GRACE: Duration = Duration::from_secs(5);

/// Spawns `def`'s command, wires a background reader that resolves pending
/// JSON-RPC calls and a second task that logs stderr, and registers the
/// resulting runtime in `active`.
pub async fn spawn_stdio(
    def: &McpServerDef,
    active: Arc<ActiveMap>,
    events: broadcast::Sender<Event>,
    started_at_ms: u64,
) -> Result<Arc<McpRuntime>, McpRuntimeError> {
    let name = def.name.clone();
    let command = def
        .command
        .clone()
        .ok_or_else(|| McpRuntimeError::SpawnFailed(name.to_string(), "no command configured".to_string()))?;

    let path = enhanced_path(std::env::var("PATH").ok().as_deref());
    let resolved = resolve_command(&command, &path)
        .ok_or_else(|| McpRuntimeError::CommandNotFound(command.clone(), name.to_string()))?;

    let mut cmd = Command::new(&resolved);
    cmd.args(&def.args)
        .env("PATH", &path)
        .envs(&def.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| McpRuntimeError::SpawnFailed(name.to_string(), e.to_string()))?;
    let pid = child.id().unwrap_or_default();
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| McpRuntimeError::SpawnFailed(name.to_string(), "no stdin handle".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| McpRuntimeError::SpawnFailed(name.to_string(), "no stdout handle".to_string()))?;
    let stderr = child.stderr.take();

    let runtime = Arc::new(McpRuntime::new_stdio(child, stdin, pid, started_at_ms));
    runtime.set_status(McpRuntimeStatus::Running);
    active.lock().insert(name.clone(), runtime.clone());

    spawn_stdout_reader(name.clone(), runtime.clone(), stdout, active.clone(), events.clone());
    if let Some(stderr) = stderr {
        spawn_stderr_logger(name.clone(), stderr);
    }

    events
        .send(Event::McpServerState {
            name: name.to_string(),
            status: "running".to_string(),
            started_at_ms: Some(started_at_ms),
            error: None,
            pid: Some(pid),
        })
        .ok();

    Ok(runtime)
}

fn spawn_stdout_reader(
    name: McpServerName,
    runtime: Arc<McpRuntime>,
    stdout: tokio::process::ChildStdout,
    active: Arc<ActiveMap>,
    events: broadcast::Sender<Event>,
) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(parsed) = parse_response_line(&line) {
                        runtime.pending.resolve(&parsed.id, parsed.outcome);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(server = %name, error = %e, "error reading mcp server stdout");
                    break;
                }
            }
        }
        runtime.pending.fail_all("mcp server process exited");
        runtime.set_status(McpRuntimeStatus::Stopped);
        active.lock().remove(&name);
        events
            .send(Event::McpServerState {
                name: name.to_string(),
                status: "stopped".to_string(),
                started_at_ms: None,
                error: None,
                pid: None,
            })
            .ok();
        tracing::info!(server = %name, "mcp server process exited");
    });
}

fn spawn_stderr_logger(name: McpServerName, stderr: tokio::process::ChildStderr) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::debug!(server = %name, "{line}");
        }
    });
}

/// Writes one line-framed JSON-RPC request to the server's stdin.
pub async fn write_request_line(runtime: &McpRuntime, line: &str) -> Result<(), McpRuntimeError> {
    let Transport::Stdio { stdin, .. } = &runtime.transport else {
        return Err(McpRuntimeError::NotRunning("not a stdio server".to_string()));
    };
    let mut guard = stdin.lock().await;
    let Some(stdin) = guard.as_mut() else {
        return Err(McpRuntimeError::NotRunning("stdin already closed".to_string()));
    };
    stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|e| McpRuntimeError::Io("stdin".to_string(), e.to_string()))
}

/// Sends a termination signal, waits up to [`STOP_GRACE`], then force-kills
/// if the process is still alive. Runs detached from the caller — the spec
/// requires the runtime to be removed from the registry immediately on stop
/// request, with this sequence completing in the background.
pub async fn stop_stdio(runtime: Arc<McpRuntime>) {
    let Transport::Stdio { child, pid, .. } = &runtime.transport else { return };

    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(*pid as i32), Signal::SIGTERM);
    }
    #[cfg(not(unix))]
    {
        let _ = *pid;
        let mut guard = child.lock().await;
        if let Some(child) = guard.as_mut() {
            let _ = child.start_kill();
        }
    }

    tokio::time::sleep(STOP_GRACE).await;

    let mut guard = child.lock().await;
    if let Some(mut child) = guard.take() {
        match child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                let _ = child.start_kill();
                let _ = child.wait().await;
            }
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
