// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! Best-effort termination of known process names, for quiescing the
//! LLM-serving binary before its files are replaced (spec §4.H step 3).
//! Cross-platform via `sysinfo` rather than a unix-only signal, since the
//! processes being stopped are native binaries on every supported OS.

use async_trait::async_trait;

#[async_trait]
pub trait ProcessTerminator: Send + Sync {
    /// Terminates every running process whose name exactly matches one of
    /// `names`. Returns how many were found and signalled; absence of a
    /// matching process is not an error (the binary may simply not be
    /// running yet).
    async fn terminate_by_name(&self, names: &[String]) -> usize;
}

pub struct SysinfoProcessTerminator;

#[async_trait]
impl ProcessTerminator for SysinfoProcessTerminator {
    async fn terminate_by_name(&self, names: &[String]) -> usize {
        let names = names.to_vec();
        tokio::task::spawn_blocking(move || {
            let system = sysinfo::System::new_all();
            let mut terminated = 0;
            for process in system.processes().values() {
                let process_name = process.name().to_string_lossy();
                if names.iter().any(|n| n == process_name.as_ref()) && process.kill() {
                    terminated += 1;
                }
            }
            terminated
        })
        .await
        .unwrap_or(0)
    }
}

#[cfg(feature = "test-support")]
pub struct FakeProcessTerminator {
    calls: parking_lot::Mutex<Vec<Vec<String>>>,
}

#[cfg(feature = "test-support")]
impl Default for FakeProcessTerminator {
    fn default() -> Self {
        Self { calls: parking_lot::Mutex::new(Vec::new()) }
    }
}

#[cfg(feature = "test-support")]
impl FakeProcessTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl ProcessTerminator for FakeProcessTerminator {
    async fn terminate_by_name(&self, names: &[String]) -> usize {
        self.calls.lock().push(names.to_vec());
        names.len()
    }
}

#[cfg(test)]
#[path = "terminator_tests.rs"]
mod tests;
