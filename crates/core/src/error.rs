// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Shared error taxonomy (spec §7).
//!
//! Every fallible boundary in the orchestrator classifies its failure into
//! one of these kinds so the daemon can decide retry/notify/block behavior
//! uniformly, instead of each component inventing its own ad-hoc error shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A suggested dialog action the GUI can render for a blocking error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogAction {
    pub label: String,
    pub url: Option<String>,
}

/// Top-level error taxonomy shared across every component.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ClaraError {
    /// No container engine reachable, OS below minimum, or a hard resource
    /// gate failure. Orchestrator continues in a degraded mode.
    #[error("environment blocker: {message}")]
    EnvironmentBlocker { message: String, actions: Vec<DialogAction> },

    /// Health probe failed, container failed to start, MCP process exited.
    /// Recovered locally up to a retry limit.
    #[error("transient service error for {key}: {message}")]
    TransientServiceError { key: String, message: String },

    /// Retries exhausted; awaits manual intervention.
    #[error("permanent service error for {key}: {message}")]
    PermanentServiceError { key: String, message: String },

    /// HTTP timeout / 5xx / rate-limit.
    #[error("network error: {message}")]
    NetworkError { message: String, retry_after_ms: Option<u64> },

    /// Malformed release data, incomplete update package, missing file.
    /// Never retried automatically.
    #[error("validation error: {message}")]
    ValidationError { message: String, actions: Vec<DialogAction> },

    /// "update already in progress", "check already running". No side
    /// effects; returned immediately.
    #[error("concurrency guard: {message}")]
    ConcurrencyGuard { message: String },
}

impl ClaraError {
    pub fn environment_blocker(message: impl Into<String>) -> Self {
        ClaraError::EnvironmentBlocker { message: message.into(), actions: Vec::new() }
    }

    pub fn transient(key: impl Into<String>, message: impl Into<String>) -> Self {
        ClaraError::TransientServiceError { key: key.into(), message: message.into() }
    }

    pub fn permanent(key: impl Into<String>, message: impl Into<String>) -> Self {
        ClaraError::PermanentServiceError { key: key.into(), message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        ClaraError::NetworkError { message: message.into(), retry_after_ms: None }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClaraError::ValidationError { message: message.into(), actions: Vec::new() }
    }

    pub fn concurrency_guard(message: impl Into<String>) -> Self {
        ClaraError::ConcurrencyGuard { message: message.into() }
    }

    /// Human-readable message suitable for a bus event, independent of kind.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
