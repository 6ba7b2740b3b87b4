// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Upstream release catalog: a single JSON endpoint naming a tag, a release
//! page, and a list of downloadable assets (spec §4.H step 1).

use crate::error::UpdateError;
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(alias = "browser_download_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseCatalogEntry {
    pub tag_name: String,
    pub html_url: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Fetches and validates the release catalog. Requires `tag_name`,
/// `html_url`, and a non-empty `assets` array, per spec.
pub async fn fetch_catalog(client: &reqwest::Client, url: &str) -> Result<ReleaseCatalogEntry, UpdateError> {
    let response =
        client.get(url).send().await.map_err(|e| UpdateError::CatalogFetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(UpdateError::CatalogFetch(format!("status {}", response.status())));
    }
    let entry: ReleaseCatalogEntry = response
        .json()
        .await
        .map_err(|e| UpdateError::CatalogMalformed(e.to_string()))?;
    if entry.tag_name.is_empty() || entry.html_url.is_empty() || entry.assets.is_empty() {
        return Err(UpdateError::CatalogMalformed(
            "missing tag_name, html_url, or assets".to_string(),
        ));
    }
    Ok(entry)
}

/// Picks the asset whose filename matches the platform/arch regex.
pub fn select_asset<'a>(entry: &'a ReleaseCatalogEntry, pattern: &Regex) -> Option<&'a ReleaseAsset> {
    entry.assets.iter().find(|a| pattern.is_match(&a.name))
}

/// Strips a leading `v` from a tag name (`v1.4.0` -> `1.4.0`); upstream
/// tags are conventionally `v`-prefixed but `version.txt` stores the bare
/// version string.
pub fn version_from_tag(tag_name: &str) -> String {
    tag_name.strip_prefix('v').unwrap_or(tag_name).to_string()
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
