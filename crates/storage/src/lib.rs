// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-storage: atomic on-disk persistence for every Clara config/state
//! artifact (spec §4.I).

pub mod atomic;
pub mod features;
pub mod last_update_check;
pub mod mcp_registry;
pub mod native_version;
pub mod pull_timestamps;

pub use atomic::save_json_atomic;
pub use features::{FeaturesDocument, FeaturesFile};
pub use last_update_check::LastUpdateCheckFile;
pub use mcp_registry::{McpRegistryDocument, McpRegistryFile};
pub use native_version::NativeVersionFile;
pub use pull_timestamps::PullTimestampFile;
