// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Doc {
    value: u32,
}

#[test]
fn missing_json_file_returns_default() {
    let dir = tempfile::tempdir().unwrap();
    let doc: Doc = load_json_tolerant(&dir.path().join("missing.json"));
    assert_eq!(doc, Doc::default());
}

#[test]
fn json_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    save_json_atomic(&path, &Doc { value: 7 }).unwrap();
    let loaded: Doc = load_json_tolerant(&path);
    assert_eq!(loaded, Doc { value: 7 });
}

#[test]
fn corrupt_json_file_returns_default_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    std::fs::write(&path, "{not valid json").unwrap();
    let loaded: Doc = load_json_tolerant(&path);
    assert_eq!(loaded, Doc::default());
}

#[test]
fn yaml_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.yaml");
    save_yaml_atomic(&path, &Doc { value: 9 }).unwrap();
    let loaded: Doc = load_yaml_tolerant(&path);
    assert_eq!(loaded, Doc { value: 9 });
}

#[test]
fn no_tmp_file_left_behind_after_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    save_json_atomic(&path, &Doc { value: 1 }).unwrap();
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
