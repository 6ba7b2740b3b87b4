// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Daemon-side adapters that close the trait-object seams each component
//! crate deliberately leaves open. Every adapter here wraps either a plain
//! `clara-storage` file type (no trait of its own -- the doc comments on the
//! traits it implements say as much) or a bare OS process this crate alone
//! knows how to spawn and supervise.

mod dependent_restarter;
mod mcp_registry;
mod native_process;
mod native_version;
mod null_engine;

pub use dependent_restarter::WatchdogDependentRestarter;
pub use mcp_registry::FileMcpRegistryStore;
pub use native_process::{as_liveness_probe, as_restarter, NativeLaunchSpec, NativeProcessError, NativeProcessSupervisor};
pub use native_version::FileVersionStore;
pub use null_engine::NullEngineHandle;
