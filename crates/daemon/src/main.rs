// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `clarad`: the Clara desktop orchestrator daemon. Runs the startup
//! sequence (spec §2), then serves the GUI's request/response command
//! surface (spec §6) over a local Unix domain socket as line-delimited
//! JSON, one `Command` in and one `Response` out per line, same framing
//! the teacher's daemon uses for its own local socket protocol.

use clara_daemon::{ClaraConfig, Dispatcher, SetupCoordinator};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match ClaraConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "could not resolve a config directory");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!("clarad starting up");
    let outcome = match SetupCoordinator::new(config.clone()).run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "setup failed");
            return std::process::ExitCode::FAILURE;
        }
    };

    let socket_path = config.config_dir.join("clarad.sock");
    if socket_path.exists() {
        let _ = std::fs::remove_file(&socket_path);
    }
    let listener = match UnixListener::bind(&socket_path) {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, path = %socket_path.display(), "failed to bind control socket");
            return std::process::ExitCode::FAILURE;
        }
    };
    info!(path = %socket_path.display(), "listening for GUI connections");

    let dispatcher = outcome.dispatcher;
    let mcp = outcome.mcp;

    let accept_loop = async {
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let dispatcher = dispatcher.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &dispatcher).await {
                            warn!(error = %e, "connection handling failed");
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept failed"),
            }
        }
    };

    tokio::select! {
        () = accept_loop => {}
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    mcp.save_running_state().await;
    let _ = std::fs::remove_file(&socket_path);
    std::process::ExitCode::SUCCESS
}

async fn handle_connection(
    stream: UnixStream,
    dispatcher: &Arc<Dispatcher>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str(&line) {
            Ok(command) => dispatcher.handle(command).await,
            Err(e) => clara_daemon::protocol::Response::Error { message: format!("malformed command: {e}") },
        };
        let mut payload = serde_json::to_vec(&response).unwrap_or_else(|_| b"{\"type\":\"error\",\"message\":\"response serialization failed\"}".to_vec());
        payload.push(b'\n');
        writer.write_all(&payload).await?;
    }
    Ok(())
}
