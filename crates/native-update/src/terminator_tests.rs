// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[tokio::test]
async fn sysinfo_terminator_runs_without_panicking_for_unknown_name() {
    let terminator = SysinfoProcessTerminator;
    let count = terminator.terminate_by_name(&["definitely-not-a-real-process-xyz".to_string()]).await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn fake_terminator_records_every_call() {
    let terminator = FakeProcessTerminator::new();
    terminator.terminate_by_name(&["llama-server".to_string()]).await;
    terminator.terminate_by_name(&["llama-server".to_string(), "comfyui-cpu".to_string()]).await;
    assert_eq!(terminator.calls().len(), 2);
    assert_eq!(terminator.calls()[1].len(), 2);
}
