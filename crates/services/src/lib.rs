// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-services: the `ServiceController` (network/volume provisioning,
//! per-service reconcile-against-engine lifecycle) and the health-predicate
//! registry it dispatches through (spec §4.D, §4.E).

pub mod controller;
pub mod health;

pub use controller::{ServiceController, ServiceError};
pub use health::{check_health, HealthContext, HealthError};

#[cfg(feature = "test-support")]
pub use health::FakeProcessLivenessProbe;
