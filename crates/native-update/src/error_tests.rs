// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[test]
fn io_error_converts_with_message_preserved() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
    let err: UpdateError = io_err.into();
    assert!(matches!(err, UpdateError::Io(msg) if msg.contains("nope")));
}

#[test]
fn incomplete_update_display_lists_missing_files() {
    let err = UpdateError::IncompleteUpdate(vec!["libcore.so".to_string()]);
    assert!(err.to_string().contains("libcore.so"));
}
