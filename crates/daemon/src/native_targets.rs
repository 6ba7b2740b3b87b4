// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The allowlisted file set for the native LLM-serving binary's install
//! directory (spec §4.H step 5: "main binaries plus a long list of shared
//! libraries including core, CPU-variant, and GPU-variant"). Distinct from
//! [`crate::catalog`], which declares the containerized `ServiceDef`s --
//! this module only concerns the upstream release archive's contents.

use clara_core::{Arch, FileManifestEntry, FileOrigin, NativeBinaryInventory, Os, PlatformTargetSet};
use std::path::PathBuf;

/// Orchestrator-authored files that ship in the platform directory but are
/// never part of an upstream release and must never be overwritten by an
/// update (spec §4.H "custom files are preserved by name-prefix allowlist").
const CUSTOM_FILE_PREFIX: &str = "clara-";

fn server_binary_name(os: Os) -> &'static str {
    if os == Os::Windows {
        "llama-server.exe"
    } else {
        "llama-server"
    }
}

fn shared_lib_names(os: Os) -> Vec<&'static str> {
    match os {
        Os::Windows => vec!["ggml.dll", "ggml-base.dll", "ggml-cpu.dll", "ggml-cuda.dll", "ggml-vulkan.dll"],
        Os::Darwin => vec!["libggml.dylib", "libggml-base.dylib", "libggml-cpu.dylib", "libggml-metal.dylib"],
        Os::Linux => vec!["libggml.so", "libggml-base.so", "libggml-cpu.so", "libggml-cuda.so", "libggml-vulkan.so"],
    }
}

/// GPU-variant libraries that are optional depending on the host's detected
/// runtime (spec §4.D GPU detection, §4.H "GPU-variant" libraries).
fn gpu_only_lib_names(os: Os) -> Vec<&'static str> {
    match os {
        Os::Windows => vec!["ggml-cuda.dll", "ggml-vulkan.dll"],
        Os::Darwin => vec!["libggml-metal.dylib"],
        Os::Linux => vec!["libggml-cuda.so", "libggml-vulkan.so"],
    }
    .into_iter()
    .collect()
}

/// Builds the target set this host's update pipeline requires: the main
/// binary and the platform's core/CPU shared libraries are essential; the
/// GPU-variant libraries are optional (a CPU-only host still validates);
/// `clara-*`-prefixed files are never replaced.
pub fn platform_target_set(os: Os) -> PlatformTargetSet {
    let binary = server_binary_name(os);
    let gpu_only: std::collections::HashSet<String> = gpu_only_lib_names(os).into_iter().map(str::to_string).collect();

    let mut essential = std::collections::HashSet::new();
    essential.insert(binary.to_string());
    let mut optional = std::collections::HashSet::new();

    for lib in shared_lib_names(os) {
        if gpu_only.contains(lib) {
            optional.insert(lib.to_string());
        } else {
            essential.insert(lib.to_string());
        }
    }

    PlatformTargetSet { essential, optional, never_replace: std::collections::HashSet::new() }
}

/// Scans `install_dir` for files matching the target set plus any
/// `clara-*`-prefixed custom files, classifying each by origin. Tolerates a
/// missing or empty directory (fresh install, nothing to inventory yet).
pub fn scan_inventory(install_dir: &PathBuf, version: &str, targets: &PlatformTargetSet) -> NativeBinaryInventory {
    let mut manifest = Vec::new();
    if let Ok(entries) = std::fs::read_dir(install_dir) {
        for entry in entries.flatten() {
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else { continue };
            if file_name == "version.txt" {
                continue;
            }
            let origin = if file_name.starts_with(CUSTOM_FILE_PREFIX) {
                FileOrigin::Custom
            } else if targets.essential.contains(&file_name) || targets.optional.contains(&file_name) {
                FileOrigin::Official
            } else {
                continue;
            };
            manifest.push(FileManifestEntry { file_name, origin });
        }
    }
    NativeBinaryInventory {
        platform_dir: install_dir.clone(),
        version: version.to_string(),
        file_manifest: manifest,
        install_dir: install_dir.clone(),
    }
}

/// Platform/arch regex fragment matching the release asset name this host
/// needs, e.g. `llama-server-linux-x64.tar.gz`. The tokens are all fixed,
/// valid regex fragments, but construction still goes through `Regex::new`
/// and returns its `Result` rather than unwrapping -- a future token change
/// that breaks the pattern becomes a reported error, not a panic.
pub fn asset_pattern(os: Os, arch: Arch) -> Result<regex::Regex, regex::Error> {
    let os_token = match os {
        Os::Linux => "linux",
        Os::Darwin => "darwin|macos",
        Os::Windows => "win(32|64)|windows",
    };
    let arch_token = match arch {
        Arch::Amd64 => "x64|amd64|x86_64",
        Arch::Arm64 => "arm64|aarch64",
        _ => ".*",
    };
    let pattern = format!(r"(?i)({os_token}).*({arch_token})\.(tar\.gz|tgz|zip)$");
    regex::Regex::new(&pattern)
}
