// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-native-update: the per-platform install-directory updater for the
//! native LLM-serving binary (spec §4.H).

mod backup;
mod catalog;
mod download;
mod error;
mod extract;
mod manifest;
mod quiesce;
mod terminator;
mod updater;
mod version_store;

pub use backup::{backup_upstream_files, restore_from_backup};
pub use catalog::{fetch_catalog, select_asset, version_from_tag, ReleaseAsset, ReleaseCatalogEntry};
pub use download::{download_to_file, DownloadHandle};
pub use error::UpdateError;
pub use extract::{extract_archive, ArchiveKind};
pub use manifest::{scan_extraction, ManifestScan};
pub use quiesce::DependentServiceRestarter;
pub use terminator::{ProcessTerminator, SysinfoProcessTerminator};
pub use updater::{NativeBinaryUpdater, UpdateOutcome, UpdateParams};
pub use version_store::VersionStore;

#[cfg(feature = "test-support")]
pub use quiesce::FakeDependentServiceRestarter;
#[cfg(feature = "test-support")]
pub use terminator::FakeProcessTerminator;
#[cfg(feature = "test-support")]
pub use version_store::FakeVersionStore;
