// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Resolves every path `clara-daemon` persists state under (spec §6
//! "Persisted state layout"). Rooted in `dirs::config_dir()` rather than an
//! `XDG_STATE_HOME`-style env-var chain, since Clara is a GUI-launched
//! desktop app and not a CLI tool that runs alongside a user shell.

use std::collections::HashMap;
use std::path::PathBuf;

use clara_core::{Arch, Os};
use clara_storage::FeaturesDocument;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a user config directory for this platform")]
    NoConfigDir,
}

/// Root configuration: the `<user-config-dir>/clara/` directory plus every
/// path derived from it.
#[derive(Debug, Clone)]
pub struct ClaraConfig {
    pub config_dir: PathBuf,
    platform_dir_name: String,
}

impl ClaraConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join("clara")))
    }

    /// Constructs directly from a given directory, bypassing `dirs`. Used by
    /// tests that need an isolated temp directory.
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir, platform_dir_name: platform_dir_name() }
    }

    pub fn pull_timestamps_path(&self) -> PathBuf {
        self.config_dir.join("pull-timestamps.json")
    }

    pub fn last_update_check_path(&self) -> PathBuf {
        self.config_dir.join("last-update-check.json")
    }

    pub fn mcp_config_path(&self) -> PathBuf {
        self.config_dir.join("mcp_config.json")
    }

    pub fn system_config_path(&self) -> PathBuf {
        self.config_dir.join("clara-system-config.yaml")
    }

    pub fn features_path(&self) -> PathBuf {
        self.config_dir.join("clara-features.yaml")
    }

    pub fn llamacpp_binaries_root(&self) -> PathBuf {
        self.config_dir.join("llamacpp-binaries")
    }

    pub fn platform_dir(&self) -> PathBuf {
        self.llamacpp_binaries_root().join(&self.platform_dir_name)
    }

    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.config_dir).await?;
        tokio::fs::create_dir_all(self.platform_dir()).await?;
        Ok(())
    }
}

fn platform_dir_name() -> String {
    match (Os::current(), Arch::current()) {
        (Os::Windows, Arch::Arm64) => "win32-arm64".to_string(),
        (Os::Windows, _) => "win32-x64".to_string(),
        (Os::Darwin, Arch::Arm64) => "darwin-arm64".to_string(),
        (Os::Darwin, _) => "darwin-x64".to_string(),
        (Os::Linux, Arch::Arm64) => "linux-arm64".to_string(),
        (Os::Linux, _) => "linux-x64".to_string(),
    }
}

/// Which optional containerized feature groups the user selected during
/// first-time setup, decoded from `clara-features.yaml`.
///
/// `clara_storage::FeaturesDocument` keeps an opaque `overrides` map so
/// unrelated callers round-trip unknown keys untouched (spec testable
/// property 8); this is the one place that knows the camelCase keys
/// (`comfyUI`, `n8n`, `ragAndTts`, `claraCore`) the GUI's `selectedFeatures`
/// block actually uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSelection {
    pub comfy_ui: bool,
    pub n8n: bool,
    pub rag_and_tts: bool,
}

const KEY_COMFY_UI: &str = "comfyUI";
const KEY_N8N: &str = "n8n";
const KEY_RAG_AND_TTS: &str = "ragAndTts";
const KEY_CLARA_CORE: &str = "claraCore";

impl FeatureSelection {
    pub fn from_document(doc: &FeaturesDocument) -> Self {
        Self {
            comfy_ui: flag(&doc.overrides, KEY_COMFY_UI),
            n8n: flag(&doc.overrides, KEY_N8N),
            rag_and_tts: flag(&doc.overrides, KEY_RAG_AND_TTS),
        }
    }

    pub fn to_overrides(self) -> HashMap<String, bool> {
        let mut overrides = HashMap::new();
        overrides.insert(KEY_COMFY_UI.to_string(), self.comfy_ui);
        overrides.insert(KEY_N8N.to_string(), self.n8n);
        overrides.insert(KEY_RAG_AND_TTS.to_string(), self.rag_and_tts);
        overrides.insert(KEY_CLARA_CORE.to_string(), true);
        overrides
    }
}

fn flag(overrides: &HashMap<String, bool>, key: &str) -> bool {
    overrides.get(key).copied().unwrap_or(false)
}
