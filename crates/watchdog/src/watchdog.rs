// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! The `Watchdog`: periodic supervision of every declared-enabled,
//! platform-included service, with single-flight restart and throttled
//! notifications (spec §4.F).

use crate::notify::NotifySink;
use crate::restart::{RestartError, ServiceRestarter};
use clara_core::{Clock, Event, EventLevel, Os, ServiceDef, ServiceKey, ServiceState, ServiceStatus};
use clara_services::health::{check_health, HealthContext};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Tunables from spec §4.F: "check_interval=30s, startup_grace=60s,
/// max_retries=3, retry_delay=10s, max_notifications=3."
#[derive(Debug, Clone, Copy)]
pub struct WatchdogParams {
    pub check_interval: Duration,
    pub startup_grace: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub max_notifications: u32,
    /// Wait after issuing the restart command before re-checking the
    /// predicate (spec §4.F step 4's "sleep 15s").
    pub post_restart_wait: Duration,
}

impl Default for WatchdogParams {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            startup_grace: Duration::from_secs(60),
            max_retries: 3,
            retry_delay: Duration::from_secs(10),
            max_notifications: 3,
            post_restart_wait: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Critical,
}

pub struct Watchdog<C: Clock = clara_core::SystemClock> {
    services: Vec<ServiceDef>,
    os: Os,
    params: WatchdogParams,
    health_ctx: HealthContext,
    restarter: Arc<dyn ServiceRestarter>,
    notify: Arc<dyn NotifySink>,
    events: broadcast::Sender<Event>,
    clock: C,
    state: Mutex<HashMap<ServiceKey, ServiceState>>,
    notif_counts: Mutex<HashMap<ServiceKey, u32>>,
    in_flight: Mutex<HashMap<ServiceKey, JoinHandle<()>>>,
    setup_complete: Notify,
}

impl<C: Clock> Watchdog<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        services: Vec<ServiceDef>,
        os: Os,
        params: WatchdogParams,
        health_ctx: HealthContext,
        restarter: Arc<dyn ServiceRestarter>,
        notify: Arc<dyn NotifySink>,
        events: broadcast::Sender<Event>,
        clock: C,
    ) -> Self {
        Self {
            services,
            os,
            params,
            health_ctx,
            restarter,
            notify,
            events,
            clock,
            state: Mutex::new(HashMap::new()),
            notif_counts: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            setup_complete: Notify::new(),
        }
    }

    pub fn service_state(&self, key: &ServiceKey) -> Option<ServiceState> {
        self.state.lock().get(key).cloned()
    }

    /// Overall health per spec §4.F: healthy iff all supervised healthy;
    /// critical iff none healthy; degraded otherwise. Excluded/disabled
    /// services are not "supervised" and don't count either way.
    pub fn overall_health(&self) -> OverallHealth {
        let state = self.state.lock();
        let supervised: Vec<&ServiceDef> = self.services.iter().filter(|d| !d.excluded_on(self.os)).collect();
        if supervised.is_empty() {
            return OverallHealth::Healthy;
        }
        let healthy = supervised
            .iter()
            .filter(|d| matches!(state.get(&d.key).map(|s| s.status), Some(ServiceStatus::Healthy)))
            .count();
        if healthy == supervised.len() {
            OverallHealth::Healthy
        } else if healthy == 0 {
            OverallHealth::Critical
        } else {
            OverallHealth::Degraded
        }
    }

    /// Short-circuits the startup grace period (spec §4.F step 2: "an
    /// external 'setup complete' signal").
    pub fn signal_setup_complete(&self) {
        self.setup_complete.notify_waiters();
    }

    /// Manual control: clears failure streaks and un-sticks any service
    /// stuck in `Failed` so the next tick can attempt recovery again.
    pub fn reset_failure_counts(&self) {
        let mut state = self.state.lock();
        for entry in state.values_mut() {
            entry.consecutive_failures = 0;
            if entry.status == ServiceStatus::Failed {
                entry.status = ServiceStatus::Unknown;
            }
        }
        self.notif_counts.lock().clear();
    }

    /// Step 1: marks every supervised service `starting`; platform-excluded
    /// services are forced to `disabled` and never touched again (spec §3
    /// invariant, testable property 1).
    /// Marks every supervised service `starting`; platform-excluded
    /// services are forced to `disabled` and never touched again (spec §3
    /// invariant, testable property 1). Exposed directly so the daemon's
    /// setup coordinator can arm state before (or independent of) `run`.
    pub fn arm(this: &Arc<Self>) {
        let mut state = this.state.lock();
        for def in &this.services {
            let status = if def.excluded_on(this.os) { ServiceStatus::Disabled } else { ServiceStatus::Starting };
            state.insert(def.key.clone(), ServiceState { status, ..Default::default() });
        }
        drop(state);
        for def in &this.services {
            this.emit_state(&def.key);
        }
    }

    /// Step 2: waits for `startup_grace` or an external setup-complete
    /// signal, whichever comes first.
    pub async fn run_grace(this: &Arc<Self>) {
        tokio::select! {
            _ = tokio::time::sleep(this.params.startup_grace) => {}
            _ = this.setup_complete.notified() => {
                info!("watchdog grace period short-circuited by setup-complete signal");
            }
        }
    }

    /// Runs forever: arm, grace, then tick on `check_interval`. The caller
    /// is expected to spawn this as a background task.
    pub async fn run(this: Arc<Self>) {
        Self::arm(&this);
        Self::run_grace(&this).await;
        loop {
            Self::tick(this.clone()).await;
            tokio::time::sleep(this.params.check_interval).await;
        }
    }

    /// Manual control: runs one supervision pass immediately.
    pub async fn trigger_health_check_now(this: Arc<Self>) {
        Self::tick(this).await;
    }

    /// Step 3: evaluates every supervised service's health predicate once.
    /// Platform-excluded services are skipped entirely — disabled forever,
    /// never restarted (testable property 1).
    pub async fn tick(this: Arc<Self>) {
        let defs: Vec<ServiceDef> = this.services.clone();
        for def in defs {
            if def.excluded_on(this.os) {
                continue;
            }
            let outcome = check_health(&this.health_ctx, &def, &def.health_predicate_id).await;
            match outcome {
                Ok(true) => this.handle_pass(&def.key).await,
                Ok(false) => this.handle_fail(this.clone(), &def).await,
                Err(e) => {
                    warn!(key = %def.key, error = %e, "health check errored, treating as failure");
                    this.handle_fail(this.clone(), &def).await;
                }
            }
        }
    }

    async fn handle_pass(&self, key: &ServiceKey) {
        let was_healthy = {
            let mut state = self.state.lock();
            let entry = state.entry(key.clone()).or_default();
            let was_healthy = entry.status == ServiceStatus::Healthy;
            entry.status = ServiceStatus::Healthy;
            entry.consecutive_failures = 0;
            entry.last_check_at_ms = Some(self.clock.epoch_ms());
            was_healthy
        };
        self.emit_state(key);
        if !was_healthy {
            self.notif_counts.lock().remove(key);
            self.announce(key, "restored", "service is healthy again", EventLevel::Success).await;
        }
    }

    async fn handle_fail(&self, this: Arc<Self>, def: &ServiceDef) {
        let key = def.key.clone();
        let (failures, recovering, crossed_into_failed) = {
            let mut state = self.state.lock();
            let entry = state.entry(key.clone()).or_default();
            entry.consecutive_failures += 1;
            entry.last_check_at_ms = Some(self.clock.epoch_ms());
            let failures = entry.consecutive_failures;
            let recovering = entry.recovering;
            let crossed = failures == self.params.max_retries + 1;
            entry.status = if failures > self.params.max_retries { ServiceStatus::Failed } else { ServiceStatus::Unhealthy };
            (failures, recovering, crossed)
        };
        self.emit_state(&key);

        if failures > self.params.max_retries {
            if crossed_into_failed {
                self.announce(&key, "failed", "retries exhausted, awaiting manual intervention", EventLevel::Error).await;
            }
            return;
        }

        self.maybe_warn(&key).await;

        if !recovering {
            self.launch_restart(this, def.clone());
        }
    }

    /// Notifications throttled to `max_notifications` per failure streak
    /// (testable property 3); the streak resets when the service recovers
    /// or `reset_failure_counts` is called.
    async fn maybe_warn(&self, key: &ServiceKey) {
        let should_emit = {
            let mut counts = self.notif_counts.lock();
            let count = counts.entry(key.clone()).or_insert(0);
            if *count < self.params.max_notifications {
                *count += 1;
                true
            } else {
                false
            }
        };
        if should_emit {
            self.announce(key, "unhealthy", "health check failing, attempting recovery", EventLevel::Warning).await;
        }
    }

    async fn announce(&self, key: &ServiceKey, verb: &str, body: &str, level: EventLevel) {
        let title = format!("{key} {verb}");
        let _ = self.events.send(Event::WatchdogNotice { title: title.clone(), body: body.to_string(), level });
        if matches!(level, EventLevel::Success | EventLevel::Error) {
            self.notify.notify(&title, body).await;
        }
    }

    fn emit_state(&self, key: &ServiceKey) {
        let Some(entry) = self.state.lock().get(key).cloned() else { return };
        let _ = self.events.send(Event::ServiceState {
            key: key.to_string(),
            status: status_label(entry.status).to_string(),
            last_check_at_ms: entry.last_check_at_ms,
            consecutive_failures: entry.consecutive_failures,
        });
    }

    /// Step 4: single-flight restart attempt. A service already `recovering`
    /// never gets a second task (testable property 2); the guard is set
    /// synchronously before the task is spawned so a concurrent `tick` can't
    /// race it. The spawned task always removes the `in_flight` entry
    /// *before* clearing `recovering` (see `finish_restart`) so a `tick`
    /// landing between the two never observes `recovering=false` while a
    /// restart task is still (or was just) in flight — it would otherwise
    /// find the stale `in_flight` entry, decline to spawn a new task, and
    /// leave the service stranded with `recovering=true` forever.
    fn launch_restart(&self, this: Arc<Self>, def: ServiceDef) {
        {
            let mut state = self.state.lock();
            let entry = state.entry(def.key.clone()).or_default();
            entry.recovering = true;
        }

        let mut in_flight = self.in_flight.lock();
        if in_flight.contains_key(&def.key) {
            return;
        }
        let key = def.key.clone();
        let handle = tokio::spawn(async move {
            this.restart_attempt(&def).await;
            this.finish_restart(&def.key);
        });
        in_flight.insert(key, handle);
    }

    /// Step 4 body: sleep `retry_delay`, call the registered restarter,
    /// sleep `post_restart_wait`, re-check the predicate. Leaves
    /// `recovering` set; the caller clears it via `finish_restart` once the
    /// `in_flight` entry is gone.
    async fn restart_attempt(&self, def: &ServiceDef) {
        tokio::time::sleep(self.params.retry_delay).await;

        let restart_result = self.restarter.restart(&def.key).await;
        if let Err(e) = restart_result {
            warn!(key = %def.key, error = %e, "restart action failed");
            return;
        }

        tokio::time::sleep(self.params.post_restart_wait).await;

        match check_health(&self.health_ctx, def, &def.health_predicate_id).await {
            Ok(true) => {
                {
                    let mut state = self.state.lock();
                    let entry = state.entry(def.key.clone()).or_default();
                    entry.status = ServiceStatus::Healthy;
                    entry.consecutive_failures = 0;
                    entry.last_check_at_ms = Some(self.clock.epoch_ms());
                }
                self.emit_state(&def.key);
                self.notif_counts.lock().remove(&def.key);
                self.announce(&def.key, "restarted", "automatic restart succeeded", EventLevel::Success).await;
            }
            Ok(false) | Err(_) => {
                info!(key = %def.key, "restart attempt did not restore health, next tick may retry");
            }
        }
    }

    /// Removes the `in_flight` entry, then clears `recovering`. Must run in
    /// this order: clearing `recovering` first would let a concurrent `tick`
    /// see `recovering=false` with a stale `in_flight` entry still present,
    /// decline to spawn a replacement, and strand the service.
    fn finish_restart(&self, key: &ServiceKey) {
        self.in_flight.lock().remove(key);
        if let Some(entry) = self.state.lock().get_mut(key) {
            entry.recovering = false;
        }
    }
}

fn status_label(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Unknown => "unknown",
        ServiceStatus::Starting => "starting",
        ServiceStatus::Healthy => "healthy",
        ServiceStatus::Unhealthy => "unhealthy",
        ServiceStatus::Failed => "failed",
        ServiceStatus::Disabled => "disabled",
        ServiceStatus::Stopped => "stopped",
    }
}

#[allow(dead_code)]
fn _assert_restart_error_is_error(e: RestartError) -> String {
    e.to_string()
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
