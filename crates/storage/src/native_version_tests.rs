// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[test]
fn missing_version_file_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let file = NativeVersionFile::new(dir.path().to_path_buf());
    assert_eq!(file.read(), None);
}

#[test]
fn write_then_read_round_trips_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let file = NativeVersionFile::new(dir.path().to_path_buf());
    file.write("1.4.2\n").unwrap();
    assert_eq!(file.read(), Some("1.4.2".to_string()));
}
