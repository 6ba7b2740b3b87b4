// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `<platform_dir>/version.txt`: the installed native binary version marker
//! (spec §4.H, §4.I).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub struct NativeVersionFile {
    path: PathBuf,
}

impl NativeVersionFile {
    pub fn new(platform_dir: PathBuf) -> Self {
        Self { path: platform_dir.join("version.txt") }
    }

    pub fn read(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok().map(|s| s.trim().to_string())
    }

    pub fn write(&self, version: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("txt.tmp");
        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(version.trim().as_bytes())?;
        tmp_file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "native_version_tests.rs"]
mod tests;
