// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Shared atomic-write helpers (spec §4.I, §7 round-trip invariant): every
//! persisted artifact is serialized fully into memory, then written via a
//! temp-file-plus-rename so no partially-valid file is ever observable.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::warn;

pub fn load_json_tolerant<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, path = %path.display(), "corrupt JSON state file, using default");
            T::default()
        }),
        Err(_) => T::default(),
    }
}

pub fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), std::io::Error> {
    let serialized = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    write_atomic(path, serialized.as_bytes())
}

pub fn load_yaml_tolerant<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(raw) => serde_yaml::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, path = %path.display(), "corrupt YAML state file, using default");
            T::default()
        }),
        Err(_) => T::default(),
    }
}

pub fn save_yaml_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), std::io::Error> {
    let serialized = serde_yaml::to_string(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    write_atomic(path, serialized.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("tmp")
    ));
    let mut tmp_file = fs::File::create(&tmp_path)?;
    tmp_file.write_all(bytes)?;
    tmp_file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
