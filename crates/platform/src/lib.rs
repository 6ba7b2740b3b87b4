// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-platform: OS/arch detection, resource and version gating, and the
//! feature-gate map that drives which services participate (spec §4.A).

pub mod cache;
pub mod gates;
pub mod probe;

pub use cache::{SystemConfigCache, CACHE_TTL_MS};
pub use gates::{binary_gate, os_gate, resource_gate, OsVersionTable};
pub use probe::PlatformProbe;
