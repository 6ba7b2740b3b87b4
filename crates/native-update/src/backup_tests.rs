// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use clara_core::{FileManifestEntry, FileOrigin};

fn inventory(install_dir: &Path) -> NativeBinaryInventory {
    NativeBinaryInventory {
        platform_dir: install_dir.to_path_buf(),
        version: "1.0.0".to_string(),
        install_dir: install_dir.to_path_buf(),
        file_manifest: vec![
            FileManifestEntry { file_name: "llama-server".to_string(), origin: FileOrigin::Official },
            FileManifestEntry { file_name: "libggml.so".to_string(), origin: FileOrigin::Official },
            FileManifestEntry { file_name: "my-model.gguf".to_string(), origin: FileOrigin::Custom },
        ],
    }
}

#[test]
fn backup_upstream_files_copies_only_official_files() {
    let install_dir = tempfile::tempdir().unwrap();
    let backup_root = tempfile::tempdir().unwrap();
    std::fs::write(install_dir.path().join("llama-server"), b"v1").unwrap();
    std::fs::write(install_dir.path().join("libggml.so"), b"v1-lib").unwrap();
    std::fs::write(install_dir.path().join("my-model.gguf"), b"weights").unwrap();

    let backup_dir =
        backup_upstream_files(install_dir.path(), &inventory(install_dir.path()), backup_root.path(), 1_000)
            .unwrap();

    assert!(backup_dir.join("llama-server").exists());
    assert!(backup_dir.join("libggml.so").exists());
    assert!(!backup_dir.join("my-model.gguf").exists());
}

#[test]
fn backup_upstream_files_skips_missing_files_without_error() {
    let install_dir = tempfile::tempdir().unwrap();
    let backup_root = tempfile::tempdir().unwrap();
    std::fs::write(install_dir.path().join("llama-server"), b"v1").unwrap();

    let backup_dir =
        backup_upstream_files(install_dir.path(), &inventory(install_dir.path()), backup_root.path(), 2_000)
            .unwrap();

    assert!(backup_dir.join("llama-server").exists());
    assert!(!backup_dir.join("libggml.so").exists());
}

#[test]
fn restore_from_backup_overwrites_install_dir_contents() {
    let install_dir = tempfile::tempdir().unwrap();
    let backup_dir = tempfile::tempdir().unwrap();
    std::fs::write(backup_dir.path().join("llama-server"), b"old-version").unwrap();
    std::fs::write(install_dir.path().join("llama-server"), b"broken-new-version").unwrap();

    restore_from_backup(install_dir.path(), backup_dir.path()).unwrap();

    let restored = std::fs::read(install_dir.path().join("llama-server")).unwrap();
    assert_eq!(restored, b"old-version");
}
