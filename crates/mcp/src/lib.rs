// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-mcp: the MCP server registry, stdio/remote runtime, JSON-RPC
//! correlation, and lifecycle supervisor (spec §4.G).

mod correlation;
mod path;
pub mod process;
pub mod registry;
pub mod remote;
mod runtime;
pub mod supervisor;
pub mod templates;

pub use registry::McpRegistryStore;
pub use runtime::{McpRuntime, McpRuntimeError};
pub use supervisor::{McpSupervisor, ToolCallOutcome};
pub use templates::mcp_templates;

#[cfg(feature = "test-support")]
pub use registry::FakeMcpRegistryStore;
