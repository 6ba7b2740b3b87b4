// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Pre-update backup and rollback of the install directory's official
//! files (spec §4.H step 6). Custom files are never touched by either
//! direction of this module.

use crate::error::UpdateError;
use clara_core::NativeBinaryInventory;
use std::path::{Path, PathBuf};

/// Copies every official file named in `inventory` into a timestamped
/// directory under `backup_root`, returning that directory's path. Used to
/// roll back if the new release fails validation.
pub fn backup_upstream_files(
    install_dir: &Path,
    inventory: &NativeBinaryInventory,
    backup_root: &Path,
    now_ms: u64,
) -> Result<PathBuf, UpdateError> {
    let backup_dir = backup_root.join(format!("backup-{now_ms}"));
    std::fs::create_dir_all(&backup_dir)?;

    for file_name in inventory.official_files() {
        let src = install_dir.join(file_name);
        if !src.exists() {
            continue;
        }
        let dst = backup_dir.join(file_name);
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&src, &dst)?;
    }

    Ok(backup_dir)
}

/// Restores every file found in `backup_dir` back into `install_dir`,
/// overwriting whatever the failed update left behind.
pub fn restore_from_backup(install_dir: &Path, backup_dir: &Path) -> Result<(), UpdateError> {
    std::fs::create_dir_all(install_dir)?;
    for entry in std::fs::read_dir(backup_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if let Some(file_name) = path.file_name() {
            std::fs::copy(&path, install_dir.join(file_name))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
