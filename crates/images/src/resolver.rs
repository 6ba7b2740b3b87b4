// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `ImageResolver`: turns (base, tag, arch) into a concrete `ImageRef` by
//! probing local presence and remote manifest availability in preferred
//! order, falling back to an arch default (spec §4.C).

use crate::resolve::{arch_default, resolve_variants};
use clara_core::{Arch, ImageRef};
use clara_engine::EngineHandle;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("engine error while resolving image: {0}")]
    Engine(#[from] clara_engine::EngineError),
}

pub struct ImageResolver {
    engine: Arc<dyn EngineHandle>,
}

impl ImageResolver {
    pub fn new(engine: Arc<dyn EngineHandle>) -> Self {
        Self { engine }
    }

    /// Resolves to the first variant confirmed present locally or remotely,
    /// in preferred order; falls back to the arch default if none confirm.
    pub async fn resolve(&self, base: &str, tag: &str, arch: Arch) -> Result<ImageRef, ResolveError> {
        for candidate in resolve_variants(base, tag, arch) {
            if self.engine.image_exists_locally(&candidate).await? {
                debug!(%candidate, "image resolved locally");
                return Ok(ImageRef::from(candidate));
            }
        }

        for candidate in resolve_variants(base, tag, arch) {
            if self.engine.remote_manifest_exists(&candidate).await? {
                debug!(%candidate, "image resolved via remote manifest");
                return Ok(ImageRef::from(candidate));
            }
        }

        let fallback = arch_default(base, tag, arch);
        debug!(%fallback, "no variant confirmed, falling back to arch default");
        Ok(ImageRef::from(fallback))
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
