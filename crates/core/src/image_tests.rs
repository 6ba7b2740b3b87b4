// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[test]
fn pull_is_fresh_just_after_pulling() {
    assert!(is_pull_fresh(Some(1_000), 1_500, false));
}

#[test]
fn pull_is_stale_after_ten_days() {
    let last = 1_000_000;
    let ten_days_later = last + PULL_FRESHNESS_MS;
    assert!(!is_pull_fresh(Some(last), ten_days_later, false));
    // One ms before the boundary is still fresh.
    assert!(is_pull_fresh(Some(last), ten_days_later - 1, false));
}

#[test]
fn forced_check_is_never_fresh() {
    assert!(!is_pull_fresh(Some(1_000), 1_001, true));
}

#[test]
fn missing_record_is_never_fresh() {
    assert!(!is_pull_fresh(None, 1_000, false));
}
