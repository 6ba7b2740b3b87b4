// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clara-core: shared data model, clock, ids, and error taxonomy for the
//! Clara orchestrator.

pub mod clock;
pub mod engine;
pub mod error;
pub mod event;
pub mod ids;
pub mod image;
pub mod mcp;
pub mod native;
pub mod platform;
pub mod service;

pub use clock::{Clock, FakeClock, SystemClock};
pub use engine::{EngineCandidate, EngineEndpoint, LocateDiagnostics, ProbeAttempt};
pub use error::{ClaraError, DialogAction};
pub use event::{Event, EventLevel};
pub use ids::{CallId, ImageRef, McpServerName, ServiceKey};
pub use image::{is_pull_fresh, LayerProgress, PullProgressEvent, UpdateCheckOutcome};
pub use mcp::{McpRuntimeStatus, McpServerDef, McpServerType, McpTemplate};
pub use native::{FileManifestEntry, FileOrigin, NativeBinaryInventory, PlatformTargetSet};
pub use platform::{
    Arch, BinaryGateResult, FeatureGateMap, Os, OsGateResult, OsVersion, PerformanceMode,
    PlatformCapabilities, ResourceGateResult, ResourceThresholds,
};
pub use service::{
    BindMount, HealthPredicateId, NamedVolumeMount, RestartPolicy, RuntimeHint, ServiceDef,
    ServiceState, ServiceStatus,
};
