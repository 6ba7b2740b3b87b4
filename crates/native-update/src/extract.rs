// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Archive extraction: tar.gz via `tar`+`flate2` (the native extractor on
//! POSIX), zip via the `zip` crate (Windows' archive format). Runs on a
//! blocking thread since both crates are synchronous (spec §4.H step 4).

use crate::error::UpdateError;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Infers the archive kind from its filename, the only signal available
    /// once the asset has been selected from the release catalog.
    pub fn from_filename(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else {
            None
        }
    }
}

/// Extracts `archive_path` into `dest` and returns the flat list of
/// relative file names that ended up on disk (the manifest scan works
/// against this list).
pub async fn extract_archive(
    archive_path: &Path,
    dest: &Path,
    kind: ArchiveKind,
) -> Result<Vec<String>, UpdateError> {
    let archive_path = archive_path.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || extract_blocking(&archive_path, &dest, kind))
        .await
        .map_err(|e| UpdateError::ExtractionFailed(e.to_string()))?
}

fn extract_blocking(archive_path: &Path, dest: &Path, kind: ArchiveKind) -> Result<Vec<String>, UpdateError> {
    std::fs::create_dir_all(dest)?;
    match kind {
        ArchiveKind::TarGz => {
            let file =
                std::fs::File::open(archive_path).map_err(|e| UpdateError::ExtractionFailed(e.to_string()))?;
            let decoder = flate2::read::GzDecoder::new(file);
            let mut archive = tar::Archive::new(decoder);
            archive.unpack(dest).map_err(|e| UpdateError::ExtractionFailed(e.to_string()))?;
        }
        ArchiveKind::Zip => {
            let file =
                std::fs::File::open(archive_path).map_err(|e| UpdateError::ExtractionFailed(e.to_string()))?;
            let mut archive =
                zip::ZipArchive::new(file).map_err(|e| UpdateError::ExtractionFailed(e.to_string()))?;
            archive.extract(dest).map_err(|e| UpdateError::ExtractionFailed(e.to_string()))?;
        }
    }
    collect_file_names(dest)
}

/// Walks `dir` recursively and returns the file name of every regular file
/// found (no `walkdir` dependency is available, so this hand-rolls it).
fn collect_file_names(dir: &Path) -> Result<Vec<String>, UpdateError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            names.extend(collect_file_names(&path)?);
        } else if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(file_name.to_string());
        }
    }
    Ok(names)
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
