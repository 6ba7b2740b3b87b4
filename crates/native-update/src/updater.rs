// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Orchestrates the full release-catalog-to-installed-binary pipeline
//! (spec §4.H). Single-flight: a second call while one is in progress is
//! rejected with `AlreadyUpdating` rather than queued.

use crate::backup::{backup_upstream_files, restore_from_backup};
use crate::catalog::{fetch_catalog, select_asset, version_from_tag, ReleaseAsset};
use crate::download::{download_to_file, DownloadHandle};
use crate::error::UpdateError;
use crate::extract::{extract_archive, ArchiveKind};
use crate::manifest::scan_extraction;
use crate::quiesce::DependentServiceRestarter;
use crate::terminator::ProcessTerminator;
use crate::version_store::VersionStore;
use clara_core::{Event, NativeBinaryInventory, PlatformTargetSet, ServiceKey};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate { version: String },
    Updated { from: Option<String>, to: String },
}

/// Everything one update run needs: where the catalog lives, which asset
/// matches this host, what the currently installed files are, and where
/// to stage temporary work.
pub struct UpdateParams {
    pub catalog_url: String,
    pub asset_pattern: Regex,
    pub install_dir: PathBuf,
    pub inventory: NativeBinaryInventory,
    pub targets: PlatformTargetSet,
    pub work_dir: PathBuf,
    pub backup_root: PathBuf,
    pub quiesce_process_names: Vec<String>,
    pub dependent_services: Vec<ServiceKey>,
    pub now_ms: u64,
}

pub struct NativeBinaryUpdater {
    http_client: reqwest::Client,
    terminator: Arc<dyn ProcessTerminator>,
    version_store: Arc<dyn VersionStore>,
    restarter: Arc<dyn DependentServiceRestarter>,
    events: broadcast::Sender<Event>,
    is_updating: AtomicBool,
}

impl NativeBinaryUpdater {
    pub fn new(
        http_client: reqwest::Client,
        terminator: Arc<dyn ProcessTerminator>,
        version_store: Arc<dyn VersionStore>,
        restarter: Arc<dyn DependentServiceRestarter>,
        events: broadcast::Sender<Event>,
    ) -> Self {
        Self { http_client, terminator, version_store, restarter, events, is_updating: AtomicBool::new(false) }
    }

    pub async fn update(&self, params: UpdateParams) -> Result<UpdateOutcome, UpdateError> {
        if self.is_updating.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return Err(UpdateError::AlreadyUpdating);
        }
        let result = self.run(params).await;
        self.is_updating.store(false, Ordering::SeqCst);
        result
    }

    async fn run(&self, params: UpdateParams) -> Result<UpdateOutcome, UpdateError> {
        let catalog = fetch_catalog(&self.http_client, &params.catalog_url).await?;
        let asset = select_asset(&catalog, &params.asset_pattern).ok_or(UpdateError::NoMatchingAsset)?.clone();
        let latest_version = version_from_tag(&catalog.tag_name);
        let current_version = self.version_store.read_version().await;

        if current_version.as_deref() == Some(latest_version.as_str()) {
            return Ok(UpdateOutcome::UpToDate { version: latest_version });
        }

        self.terminator.terminate_by_name(&params.quiesce_process_names).await;
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        let result = self.install(&params, &asset, &latest_version).await;
        self.restart_dependent_services(&params.dependent_services).await;
        result
    }

    async fn install(
        &self,
        params: &UpdateParams,
        asset: &ReleaseAsset,
        latest_version: &str,
    ) -> Result<UpdateOutcome, UpdateError> {
        tokio::fs::create_dir_all(&params.work_dir).await?;
        let archive_path = params.work_dir.join(&asset.name);
        let handle = DownloadHandle::new();

        if let Err(e) =
            download_to_file(&self.http_client, &asset.url, &archive_path, &asset.name, &self.events, &handle).await
        {
            let _ = tokio::fs::remove_file(&archive_path).await;
            return Err(e);
        }

        let kind = ArchiveKind::from_filename(&asset.name)
            .ok_or_else(|| UpdateError::ExtractionFailed(format!("unrecognized archive type: {}", asset.name)))?;
        let extract_dir = params.work_dir.join("extracted");
        let extracted = extract_archive(&archive_path, &extract_dir, kind).await;
        let _ = tokio::fs::remove_file(&archive_path).await;
        let extracted = extracted?;

        let scan = scan_extraction(&extracted, &params.targets);
        if !scan.is_complete() {
            let _ = tokio::fs::remove_dir_all(&extract_dir).await;
            return Err(UpdateError::IncompleteUpdate(scan.missing_essential));
        }

        let backup_dir =
            backup_upstream_files(&params.install_dir, &params.inventory, &params.backup_root, params.now_ms)?;

        let install_result = self.copy_into_place(&extract_dir, &params.install_dir, &params.targets).await;
        let _ = tokio::fs::remove_dir_all(&extract_dir).await;
        if let Err(e) = install_result {
            restore_from_backup(&params.install_dir, &backup_dir)?;
            return Err(e);
        }

        self.version_store.write_version(latest_version).await?;

        if let Err(e) = self.validate(&params.install_dir, &params.targets) {
            restore_from_backup(&params.install_dir, &backup_dir)?;
            return Err(e);
        }

        Ok(UpdateOutcome::Updated { from: current_version_label(&params.inventory), to: latest_version.to_string() })
    }

    async fn copy_into_place(
        &self,
        extract_dir: &Path,
        install_dir: &Path,
        targets: &PlatformTargetSet,
    ) -> Result<(), UpdateError> {
        tokio::fs::create_dir_all(install_dir).await?;
        let mut entries = tokio::fs::read_dir(extract_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if targets.never_replace.contains(file_name) {
                continue;
            }
            let dest = install_dir.join(file_name);
            tokio::fs::copy(&path, &dest).await?;
            mark_executable_if_binary(&dest, file_name, targets);
        }
        Ok(())
    }

    fn validate(&self, install_dir: &Path, targets: &PlatformTargetSet) -> Result<(), UpdateError> {
        let mut missing: Vec<String> =
            targets.essential.iter().filter(|name| !install_dir.join(name).exists()).cloned().collect();
        missing.sort();
        if !missing.is_empty() {
            return Err(UpdateError::ValidationFailed(format!("missing after install: {missing:?}")));
        }
        Ok(())
    }

    async fn restart_dependent_services(&self, services: &[ServiceKey]) {
        for key in services {
            if let Err(e) = self.restarter.restart(key).await {
                tracing::warn!(service = %key, error = %e, "failed to restart service after native binary update");
            }
        }
    }
}

fn current_version_label(inventory: &NativeBinaryInventory) -> Option<String> {
    if inventory.version.is_empty() {
        None
    } else {
        Some(inventory.version.clone())
    }
}

#[cfg(unix)]
fn mark_executable_if_binary(path: &Path, file_name: &str, targets: &PlatformTargetSet) {
    use std::os::unix::fs::PermissionsExt;
    if !targets.essential.contains(file_name) && !targets.optional.contains(file_name) {
        return;
    }
    if let Ok(metadata) = std::fs::metadata(path) {
        let mut permissions = metadata.permissions();
        permissions.set_mode(permissions.mode() | 0o111);
        let _ = std::fs::set_permissions(path, permissions);
    }
}

#[cfg(not(unix))]
fn mark_executable_if_binary(_path: &Path, _file_name: &str, _targets: &PlatformTargetSet) {}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;
