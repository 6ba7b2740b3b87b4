// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The three gates evaluated during platform probing (spec §4.A): resource,
//! OS version, and platform-binary presence.

use clara_core::{
    BinaryGateResult, Os, OsGateResult, OsVersion, ResourceGateResult, ResourceThresholds,
};
use std::path::Path;

/// Evaluates the resource gate given measured host resources.
pub fn resource_gate(
    ram_gb: f64,
    cores: u32,
    free_disk_gb: f64,
    thresholds: &ResourceThresholds,
) -> ResourceGateResult {
    let all_minimums_met = ram_gb >= thresholds.min_ram_gb
        && cores >= thresholds.min_cores
        && free_disk_gb >= thresholds.min_free_disk_gb;
    let all_recommended_met = ram_gb >= thresholds.recommended_ram_gb
        && cores >= thresholds.recommended_cores
        && free_disk_gb >= thresholds.recommended_free_disk_gb;
    ResourceGateResult { ram_gb, cores, free_disk_gb, all_minimums_met, all_recommended_met }
}

/// Per-OS minimum/recommended version table.
#[derive(Debug, Clone, Copy)]
pub struct OsVersionTable {
    pub min: OsVersion,
    pub recommended: OsVersion,
    pub upgrade_url: &'static str,
}

impl OsVersionTable {
    pub fn for_os(os: Os) -> Self {
        match os {
            Os::Windows => Self {
                min: OsVersion::new(10, 0, 19041),
                recommended: OsVersion::new(10, 0, 22621),
                upgrade_url: "https://www.microsoft.com/software-download/windows11",
            },
            Os::Darwin => Self {
                min: OsVersion::new(12, 0, 0),
                recommended: OsVersion::new(14, 0, 0),
                upgrade_url: "https://support.apple.com/macos/upgrade",
            },
            Os::Linux => Self {
                min: OsVersion::new(5, 10, 0),
                recommended: OsVersion::new(6, 1, 0),
                upgrade_url: "https://www.kernel.org",
            },
        }
    }
}

/// Evaluates the OS gate: supported / warnings / recommendations /
/// upgrade_instructions.
pub fn os_gate(os: Os, version: OsVersion) -> OsGateResult {
    let table = OsVersionTable::for_os(os);
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();
    let supported = version >= table.min;

    if !supported {
        warnings.push(format!(
            "{os:?} {version:?} is below the minimum supported version {:?}",
            table.min
        ));
    } else if version < table.recommended {
        recommendations.push(format!(
            "Upgrading to {:?} or later is recommended for the best experience",
            table.recommended
        ));
    }

    let upgrade_instructions =
        if !supported { Some(table.upgrade_url.to_string()) } else { None };

    OsGateResult { supported, warnings, recommendations, upgrade_instructions }
}

/// Evaluates the platform-binary gate: platform directory exists and the
/// expected files are present and executable. Fatal for §4.8-equivalent
/// (native binary update) operations when it fails.
pub fn binary_gate(platform_dir: &Path, expected_files: &[&str]) -> BinaryGateResult {
    let platform_dir_exists = platform_dir.is_dir();
    let mut missing_files = Vec::new();
    let mut non_executable_files = Vec::new();

    if platform_dir_exists {
        for file in expected_files {
            let path = platform_dir.join(file);
            if !path.is_file() {
                missing_files.push(file.to_string());
                continue;
            }
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(meta) = path.metadata() {
                    if meta.permissions().mode() & 0o111 == 0 {
                        non_executable_files.push(file.to_string());
                    }
                }
            }
        }
    } else {
        missing_files.extend(expected_files.iter().map(|f| f.to_string()));
    }

    BinaryGateResult { platform_dir_exists, missing_files, non_executable_files }
}

#[cfg(test)]
#[path = "gates_tests.rs"]
mod tests;
