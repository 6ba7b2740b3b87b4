// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Wires `clara_native_update::VersionStore` to the file-backed
//! `clara_storage::NativeVersionFile` (spec §4.H, §4.I
//! `<platform_dir>/version.txt`).

use async_trait::async_trait;
use clara_native_update::VersionStore;
use clara_storage::NativeVersionFile;

pub struct FileVersionStore {
    file: NativeVersionFile,
}

impl FileVersionStore {
    pub fn new(platform_dir: std::path::PathBuf) -> Self {
        Self { file: NativeVersionFile::new(platform_dir) }
    }
}

#[async_trait]
impl VersionStore for FileVersionStore {
    async fn read_version(&self) -> Option<String> {
        self.file.read()
    }

    async fn write_version(&self, version: &str) -> Result<(), std::io::Error> {
        self.file.write(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_version_string() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = FileVersionStore::new(dir.path().to_path_buf());
        assert_eq!(store.read_version().await, None);
        store.write_version("1.4.0").await.unwrap_or_else(|e| panic!("write: {e}"));
        assert_eq!(store.read_version().await, Some("1.4.0".to_string()));
    }
}
