// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Pure arch-variant resolution (spec §4.C) — independently testable
//! without a container engine.

use clara_core::Arch;

/// Suffix appended to a tag for an arch-specific variant, e.g. `amd64` in
/// `myimage:latest-amd64`. Images without a known variant just use the base
/// tag; this table only covers images that publish per-arch tags.
fn arch_suffix(arch: Arch) -> &'static str {
    match arch {
        Arch::Amd64 => "amd64",
        Arch::Arm64 => "arm64",
        Arch::Other => "amd64",
    }
}

/// The arch every image is assumed to publish a working default for when no
/// variant could be confirmed available.
fn arch_default_suffix(arch: Arch) -> &'static str {
    match arch {
        Arch::Amd64 => "amd64",
        Arch::Arm64 => "arm64",
        Arch::Other => "amd64",
    }
}

/// Produces candidate image references in preferred order: the base tag
/// first, then the arch-suffixed tag, matching spec §4.C's "base tag, then
/// tag-amd64" ordering.
pub fn resolve_variants(base: &str, tag: &str, arch: Arch) -> Vec<String> {
    let mut variants = vec![format!("{base}:{tag}")];
    let suffixed = format!("{base}:{tag}-{}", arch_suffix(arch));
    if !variants.contains(&suffixed) {
        variants.push(suffixed);
    }
    variants
}

/// The final fallback reference used when none of `resolve_variants`'
/// candidates are confirmed available locally or remotely.
pub fn arch_default(base: &str, tag: &str, arch: Arch) -> String {
    format!("{base}:{tag}-{}", arch_default_suffix(arch))
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
