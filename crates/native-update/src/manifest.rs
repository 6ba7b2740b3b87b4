// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Checks a freshly extracted release against the platform's required file
//! set before anything is copied into the install directory (spec §4.H
//! step 5: an incomplete extraction must abort rather than partially
//! install).

use clara_core::PlatformTargetSet;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestScan {
    pub present: HashSet<String>,
    pub missing_essential: Vec<String>,
}

impl ManifestScan {
    pub fn is_complete(&self) -> bool {
        self.missing_essential.is_empty()
    }
}

/// Compares the names found in an extraction against `targets.essential`.
/// Missing essential files are reported in target-set order so the error
/// message is stable across runs.
pub fn scan_extraction(extracted_names: &[String], targets: &PlatformTargetSet) -> ManifestScan {
    let present: HashSet<String> = extracted_names.iter().cloned().collect();
    let mut missing_essential: Vec<String> =
        targets.essential.iter().filter(|name| !present.contains(*name)).cloned().collect();
    missing_essential.sort();
    ManifestScan { present, missing_essential }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
