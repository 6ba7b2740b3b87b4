// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;
use clara_core::EngineCandidate;
use clara_engine::FakeEngineHandle;

fn fake_handle() -> Arc<FakeEngineHandle> {
    Arc::new(FakeEngineHandle::new(EngineCandidate {
        endpoint: clara_core::EngineEndpoint::DefaultEnv,
        priority: 0,
        discovery_index: 0,
        kind: "fake".to_string(),
    }))
}

#[tokio::test]
async fn prefers_local_base_tag_over_everything() {
    let engine = fake_handle();
    engine.mark_image_local("clara/ollama:latest");
    let resolver = ImageResolver::new(engine);

    let resolved = resolver.resolve("clara/ollama", "latest", Arch::Amd64).await.unwrap();
    assert_eq!(resolved.as_str(), "clara/ollama:latest");
}

#[tokio::test]
async fn falls_back_to_remote_manifest_when_not_local() {
    let engine = fake_handle();
    engine.mark_remote_manifest("clara/ollama:latest-amd64");
    let resolver = ImageResolver::new(engine);

    let resolved = resolver.resolve("clara/ollama", "latest", Arch::Amd64).await.unwrap();
    assert_eq!(resolved.as_str(), "clara/ollama:latest-amd64");
}

#[tokio::test]
async fn falls_back_to_arch_default_when_nothing_confirmed() {
    let engine = fake_handle();
    let resolver = ImageResolver::new(engine);

    let resolved = resolver.resolve("clara/ollama", "latest", Arch::Arm64).await.unwrap();
    assert_eq!(resolved.as_str(), "clara/ollama:latest-arm64");
}
