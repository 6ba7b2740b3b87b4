// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-images: image resolution, update-check classification, and
//! streamed pulls with freshness throttling.

pub mod puller;
pub mod resolve;
pub mod resolver;
pub mod timestamps;
pub mod updates;

pub use puller::{PullError, Puller};
pub use resolve::{arch_default, resolve_variants};
pub use resolver::{ImageResolver, ResolveError};
pub use timestamps::PullTimestampStore;
pub use updates::UpdateChecker;

#[cfg(feature = "test-support")]
pub use timestamps::FakePullTimestampStore;
