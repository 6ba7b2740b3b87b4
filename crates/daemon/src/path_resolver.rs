// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Resolves where the native LLM-serving binary lives: bundled alongside
//! the orchestrator in a packaged build, or previously downloaded into the
//! per-platform install directory (spec §4.H "detection of bundled vs.
//! downloaded binary locations"; Design Notes' redesign flag for the
//! original's "mixed sync/async file checks around `process.resourcesPath`").
//!
//! Mirrors the GUI-framework convention the original scatters ad hoc:
//! `development` mode resolves against the repo-relative `resources/`
//! directory next to the running binary, `production` against the
//! platform's installed app-resources directory. Resolution itself is a
//! pure function of `(mode, root, file_name)` plus whatever the caller
//! tells it already exists on disk -- it never probes the filesystem on
//! its own, so it stays testable without a real install directory.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    Development,
    Production,
}

impl ResolutionMode {
    /// Packaged builds set `CLARA_PACKAGED=1`; anything else is treated as
    /// a development checkout.
    pub fn detect() -> Self {
        match std::env::var("CLARA_PACKAGED").as_deref() {
            Ok("1") => ResolutionMode::Production,
            _ => ResolutionMode::Development,
        }
    }
}

/// Resolves the native binary's location given both candidate roots and a
/// predicate for "does this path exist" -- injected so tests don't need a
/// real filesystem.
pub struct PathResolver<F: Fn(&Path) -> bool> {
    mode: ResolutionMode,
    bundled_root: PathBuf,
    downloaded_root: PathBuf,
    exists: F,
}

impl<F: Fn(&Path) -> bool> PathResolver<F> {
    pub fn new(mode: ResolutionMode, bundled_root: PathBuf, downloaded_root: PathBuf, exists: F) -> Self {
        Self { mode, bundled_root, downloaded_root, exists }
    }

    /// In development mode, prefer the bundled resources directory (so a
    /// repo checkout doesn't need a prior download) but still fall back to
    /// a previously-downloaded binary; in production, prefer the
    /// downloaded copy since that's where updates land, falling back to
    /// whatever shipped in the installer.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let bundled = self.bundled_root.join(file_name);
        let downloaded = self.downloaded_root.join(file_name);
        let (first, second) = match self.mode {
            ResolutionMode::Development => (bundled, downloaded),
            ResolutionMode::Production => (downloaded, bundled),
        };
        if (self.exists)(&first) {
            Some(first)
        } else if (self.exists)(&second) {
            Some(second)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_prefers_bundled() {
        let resolver = PathResolver::new(
            ResolutionMode::Development,
            PathBuf::from("/bundled"),
            PathBuf::from("/downloaded"),
            |p| p == Path::new("/bundled/llama-server") || p == Path::new("/downloaded/llama-server"),
        );
        assert_eq!(resolver.resolve("llama-server"), Some(PathBuf::from("/bundled/llama-server")));
    }

    #[test]
    fn production_prefers_downloaded() {
        let resolver = PathResolver::new(
            ResolutionMode::Production,
            PathBuf::from("/bundled"),
            PathBuf::from("/downloaded"),
            |p| p == Path::new("/bundled/llama-server") || p == Path::new("/downloaded/llama-server"),
        );
        assert_eq!(resolver.resolve("llama-server"), Some(PathBuf::from("/downloaded/llama-server")));
    }

    #[test]
    fn falls_back_when_preferred_root_is_missing() {
        let resolver =
            PathResolver::new(ResolutionMode::Production, PathBuf::from("/bundled"), PathBuf::from("/downloaded"), |p| {
                p == Path::new("/bundled/llama-server")
            });
        assert_eq!(resolver.resolve("llama-server"), Some(PathBuf::from("/bundled/llama-server")));
    }

    #[test]
    fn none_when_neither_root_has_the_file() {
        let resolver =
            PathResolver::new(ResolutionMode::Production, PathBuf::from("/bundled"), PathBuf::from("/downloaded"), |_| false);
        assert_eq!(resolver.resolve("llama-server"), None);
    }
}
