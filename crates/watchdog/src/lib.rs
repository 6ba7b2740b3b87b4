// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-watchdog: periodic health supervision, single-flight restart
//! orchestration, and notification throttling (spec §4.F).

pub mod notify;
pub mod restart;
pub mod watchdog;

pub use notify::NotifySink;
pub use restart::{RestartError, ServiceRestarter};
pub use watchdog::{OverallHealth, Watchdog, WatchdogParams};

#[cfg(feature = "test-support")]
pub use notify::FakeNotifySink;

#[cfg(feature = "test-support")]
pub use restart::FakeRestarter;
