// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Streamed archive download with a cooperative cancellation flag checked
//! between chunks (spec §5 "downloads expose a cooperative stop"). On
//! cancellation or error the partial file is unlinked rather than left
//! behind.

use crate::error::UpdateError;
use clara_core::Event;
use futures_util::StreamExt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;

/// A handle the caller can use to cooperatively cancel an in-flight
/// download from another task.
#[derive(Clone, Default)]
pub struct DownloadHandle {
    cancelled: Arc<AtomicBool>,
}

impl DownloadHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Downloads `url` to `dest`, emitting `Event::DownloadProgress` after every
/// chunk. Removes the partial file and returns `DownloadCancelled` if
/// `handle` is cancelled mid-stream.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    file_name: &str,
    events: &broadcast::Sender<Event>,
    handle: &DownloadHandle,
) -> Result<(), UpdateError> {
    let response =
        client.get(url).send().await.map_err(|e| UpdateError::DownloadFailed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(UpdateError::DownloadFailed(format!("status {}", response.status())));
    }
    let total_bytes = response.content_length();

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::File::create(dest).await?;
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        if handle.is_cancelled() {
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
            return Err(UpdateError::DownloadCancelled);
        }
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(dest).await;
                return Err(UpdateError::DownloadFailed(e.to_string()));
            }
        };
        if let Err(e) = file.write_all(&chunk).await {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(UpdateError::Io(e.to_string()));
        }
        downloaded += chunk.len() as u64;
        let percentage = total_bytes.map(|total| (downloaded as f32 / total.max(1) as f32) * 100.0);
        events
            .send(Event::DownloadProgress {
                file_name: file_name.to_string(),
                bytes: downloaded,
                total_bytes,
                percentage,
            })
            .ok();
    }
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
