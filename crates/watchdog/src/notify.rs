// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! OS desktop toast notifications (spec §5 "Notifications dedupe via a
//! small LRU-style map of active notifications, auto-dismissed after 5s").
//!
//! This is the ambient observability layer SPEC_FULL.md calls out: the bus
//! event (`Event::WatchdogNotice`) always fires; the desktop toast is a
//! best-effort addition reserved for restore/critical transitions so the
//! user isn't spammed by every transient failure.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn notify(&self, title: &str, body: &str);
}

/// Desktop notifications via `notify-rust`, matching the host stack's
/// existing notification adapter. Deduplicates identical (title, body)
/// pairs within `NOTIFICATION_TTL` so a flapping service doesn't produce a
/// toast storm.
pub struct DesktopNotifySink {
    active: parking_lot::Mutex<HashMap<(String, String), Instant>>,
}

impl DesktopNotifySink {
    pub fn new() -> Self {
        Self { active: parking_lot::Mutex::new(HashMap::new()) }
    }

    fn should_emit(&self, title: &str, body: &str) -> bool {
        let key = (title.to_string(), body.to_string());
        let mut active = self.active.lock();
        active.retain(|_, fired_at| fired_at.elapsed() < NOTIFICATION_TTL);
        if active.contains_key(&key) {
            return false;
        }
        active.insert(key, Instant::now());
        true
    }
}

impl Default for DesktopNotifySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotifySink for DesktopNotifySink {
    async fn notify(&self, title: &str, body: &str) {
        if !self.should_emit(title, body) {
            return;
        }
        let title = title.to_string();
        let body = body.to_string();
        let _ = tokio::task::spawn_blocking(move || {
            let _ = notify_rust::Notification::new().summary(&title).body(&body).show();
        })
        .await;
    }
}

#[cfg(feature = "test-support")]
pub struct FakeNotifySink {
    pub sent: parking_lot::Mutex<Vec<(String, String)>>,
}

#[cfg(feature = "test-support")]
impl Default for FakeNotifySink {
    fn default() -> Self {
        Self { sent: parking_lot::Mutex::new(Vec::new()) }
    }
}

#[cfg(feature = "test-support")]
impl FakeNotifySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl NotifySink for FakeNotifySink {
    async fn notify(&self, title: &str, body: &str) {
        self.sent.lock().push((title.to_string(), body.to_string()));
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
