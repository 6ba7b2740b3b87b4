// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Update-check classification: wraps a pull stream in "check mode" and
//! classifies the outcome without committing to a full pull (spec §4.C).

use crate::puller::{PullError, Puller};
use clara_core::{Arch, UpdateCheckOutcome};
use futures_util::StreamExt;
use tracing::warn;

pub struct UpdateChecker<'a> {
    puller: &'a Puller,
}

impl<'a> UpdateChecker<'a> {
    pub fn new(puller: &'a Puller) -> Self {
        Self { puller }
    }

    /// Classifies the outcome of checking `image_ref` for updates. Inspects
    /// streamed status records rather than performing a full pull; if a
    /// platform-hinted pull fails, retries once without the hint.
    pub async fn check(&self, base: &str, tag: &str, arch: Arch) -> UpdateCheckOutcome {
        match self.check_with_arch(base, tag, Some(arch)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(%base, %tag, "platform-hinted update check failed, retrying without hint");
                self.check_with_arch(base, tag, None).await.unwrap_or(UpdateCheckOutcome::CheckFailed)
            }
        }
    }

    async fn check_with_arch(
        &self,
        base: &str,
        tag: &str,
        arch: Option<Arch>,
    ) -> Result<UpdateCheckOutcome, PullError> {
        let image_ref = match arch {
            Some(arch) => crate::resolve::arch_default(base, tag, arch),
            None => format!("{base}:{tag}"),
        };

        let mut stream = self.puller.pull_stream(&image_ref).await?;
        let mut saw_download = false;
        let mut saw_up_to_date = false;

        while let Some(event) = stream.next().await {
            let event = event?;
            let status = event.status_text.to_lowercase();
            if status.contains("already") || status.contains("up to date") || status.contains("up-to-date") {
                saw_up_to_date = true;
            }
            if status.contains("downloading") || status.contains("pulling fs layer") {
                saw_download = true;
            }
        }

        if saw_download {
            Ok(UpdateCheckOutcome::UpdateAvailable)
        } else if saw_up_to_date {
            Ok(UpdateCheckOutcome::UpToDate)
        } else {
            // No download observed and no explicit "up to date" marker: the
            // registry already had it cached locally, so treat as current.
            Ok(UpdateCheckOutcome::UpToDate)
        }
    }
}

#[cfg(test)]
#[path = "updates_tests.rs"]
mod tests;
