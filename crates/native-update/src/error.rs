// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Error taxonomy for the native binary updater, local to this crate the
//! same way `clara-services::ServiceError` and `clara-engine::EngineError`
//! are — `clara-daemon` classifies these into `clara_core::ClaraError` at
//! the command-surface boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to fetch release catalog: {0}")]
    CatalogFetch(String),

    #[error("release catalog is malformed: {0}")]
    CatalogMalformed(String),

    #[error("no release asset matches this platform/arch")]
    NoMatchingAsset,

    #[error("an update is already in progress")]
    AlreadyUpdating,

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("download was cancelled")]
    DownloadCancelled,

    #[error("failed to extract archive: {0}")]
    ExtractionFailed(String),

    #[error("incomplete update: missing essential files {0:?}")]
    IncompleteUpdate(Vec<String>),

    #[error("validation failed after install: {0}")]
    ValidationFailed(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for UpdateError {
    fn from(e: std::io::Error) -> Self {
        UpdateError::Io(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
