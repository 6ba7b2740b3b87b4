// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

//! `Dispatcher`: turns one `Command` into one `Response` by delegating to
//! whichever component owns that concern. Holds every subsystem `Arc` the
//! setup coordinator assembled; does no orchestration logic of its own
//! beyond routing and the thin translations a JSON command surface needs
//! (spec §6).

use crate::adapters::NativeProcessSupervisor;
use crate::catalog::native_service_key;
use crate::config::ClaraConfig;
use crate::protocol::{Command, McpDiagnosis, McpServerPatch, Response, ServiceAction, ServiceSummary};
use clara_core::{Arch, CallId, ClaraError, Clock, Event, McpServerName, NativeBinaryInventory, Os, PlatformTargetSet, ServiceDef, ServiceKey, SystemClock};
use clara_engine::{ContainerState, EngineHandle, LocateDiagnostics};
use clara_images::{updates::UpdateChecker, Puller};
use clara_mcp::McpSupervisor;
use clara_native_update::{NativeBinaryUpdater, UpdateOutcome, UpdateParams, VersionStore};
use clara_services::health::HealthContext;
use clara_services::ServiceController;
use clara_watchdog::Watchdog;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Static fields needed to build an `UpdateParams` on each `native.update`
/// call; `now_ms` is stamped fresh from the clock every time.
#[derive(Clone)]
pub struct NativeUpdateConfig {
    pub catalog_url: String,
    pub asset_pattern: Regex,
    pub install_dir: PathBuf,
    pub inventory: NativeBinaryInventory,
    pub targets: PlatformTargetSet,
    pub work_dir: PathBuf,
    pub backup_root: PathBuf,
    pub quiesce_process_names: Vec<String>,
    pub dependent_services: Vec<ServiceKey>,
}

pub struct Dispatcher<C: Clock = SystemClock> {
    os: Os,
    network_name: String,
    services: Vec<ServiceDef>,
    engine: Arc<dyn EngineHandle>,
    controller: Arc<ServiceController<C>>,
    health_ctx: HealthContext,
    watchdog: Arc<Watchdog<C>>,
    mcp: Arc<McpSupervisor<C>>,
    native_process: Arc<NativeProcessSupervisor>,
    native_updater: Arc<NativeBinaryUpdater>,
    update_config: NativeUpdateConfig,
    puller: Arc<Puller<C>>,
    config: ClaraConfig,
    clock: C,
    events: broadcast::Sender<Event>,
    version_store: Arc<dyn VersionStore>,
    engine_diagnostics: Option<LocateDiagnostics>,
}

impl<C: Clock + Clone> Dispatcher<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        os: Os,
        network_name: String,
        services: Vec<ServiceDef>,
        engine: Arc<dyn EngineHandle>,
        controller: Arc<ServiceController<C>>,
        health_ctx: HealthContext,
        watchdog: Arc<Watchdog<C>>,
        mcp: Arc<McpSupervisor<C>>,
        native_process: Arc<NativeProcessSupervisor>,
        native_updater: Arc<NativeBinaryUpdater>,
        update_config: NativeUpdateConfig,
        puller: Arc<Puller<C>>,
        config: ClaraConfig,
        clock: C,
        events: broadcast::Sender<Event>,
        version_store: Arc<dyn VersionStore>,
        engine_diagnostics: Option<LocateDiagnostics>,
    ) -> Self {
        Self {
            os,
            network_name,
            services,
            engine,
            controller,
            health_ctx,
            watchdog,
            mcp,
            native_process,
            native_updater,
            update_config,
            puller,
            config,
            clock,
            events,
            version_store,
            engine_diagnostics,
        }
    }

    fn find_service(&self, key: &ServiceKey) -> Option<&ServiceDef> {
        self.services.iter().find(|d| &d.key == key)
    }

    pub async fn handle(&self, command: Command) -> Response {
        match command {
            Command::EngineDetect | Command::EngineTestAll => self.engine_ping().await,
            Command::EngineReport => self.engine_report(),

            Command::ServicesList => self.services_list(),
            Command::ServicesAction { name, action } => self.services_action(&name, action).await,
            Command::ServicesLogs { name, tail } => self.services_logs(&name, tail).await,
            Command::ServicesStats { name } => self.services_stats(&name).await,

            Command::ImagesCheckUpdates => self.images_check_updates().await,
            Command::ImagesUpdate { names } => self.images_update(names).await,

            Command::LlmStart => ok_or_error(self.native_process.start().await.map_err(|e| e.to_string())),
            Command::LlmStop => ok_or_error(self.native_process.stop().await.map_err(|e| e.to_string())),
            Command::LlmRestart => {
                use clara_watchdog::ServiceRestarter;
                ok_or_error(
                    self.native_process
                        .restart(&native_service_key())
                        .await
                        .map_err(|e| e.to_string()),
                )
            }
            Command::LlmStatus => Response::LlmStatus { running: self.native_process.is_running().await },
            Command::LlmModels => Response::LlmModels { models: self.native_process.list_models().await },
            Command::LlmRegenerateConfig => self.llm_regenerate_config().await,

            Command::McpList => Response::McpList { servers: self.mcp.list() },
            Command::McpAdd { def } => {
                self.mcp.upsert(def);
                self.mcp.save_running_state().await;
                Response::Ok
            }
            Command::McpRemove { name } => {
                self.mcp.remove(&name);
                self.mcp.save_running_state().await;
                Response::Ok
            }
            Command::McpUpdate { name, patch } => self.mcp_update(&name, patch).await,
            Command::McpStart { name } => ok_or_error(self.mcp.start(&name).await.map_err(|e| e.to_string())),
            Command::McpStop { name } => {
                self.mcp.stop(&name).await;
                Response::Ok
            }
            Command::McpRestart { name } => {
                self.mcp.stop(&name).await;
                ok_or_error(self.mcp.start(&name).await.map_err(|e| e.to_string()))
            }
            Command::McpTest { name } => ok_or_error(self.mcp.list_tools(&name).await.map(|_| ()).map_err(|e| e.to_string())),
            Command::McpTemplates => Response::McpTemplates { templates: self.mcp.templates().to_vec() },
            Command::McpStartAllEnabled => {
                self.mcp.start_all_enabled().await;
                Response::Ok
            }
            Command::McpStopAll => {
                self.mcp.stop_all().await;
                Response::Ok
            }
            Command::McpStartPreviouslyRunning => {
                let last_running = self.mcp.load_registry().await;
                self.mcp.start_previously_running(&last_running).await;
                Response::Ok
            }
            Command::McpSaveRunningState => {
                self.mcp.save_running_state().await;
                Response::Ok
            }
            Command::McpExecuteTool { name, tool_name, arguments } => {
                let call_id = CallId::from(uuid::Uuid::new_v4().to_string());
                match self.mcp.call_tool(&name, &tool_name, arguments, call_id).await {
                    Ok(result) => Response::McpToolResult { result },
                    Err(e) => Response::Error { message: e.to_string() },
                }
            }
            Command::McpDiagnoseRuntime { name } => self.mcp_diagnose(&name),

            Command::NativeCheckUpdates => self.native_check_updates().await,
            Command::NativeUpdate => self.native_update().await,
        }
    }

    /// `engine.detect`/`engine.test_all`: a fresh liveness ping against the
    /// engine already located at setup.
    async fn engine_ping(&self) -> Response {
        match self.engine.ping().await {
            Ok(()) => Response::EngineReport { endpoint: Some("reachable".to_string()), attempts: 1 },
            Err(e) => Response::from_error(&ClaraError::environment_blocker(e.to_string())),
        }
    }

    /// `engine.report`: the full candidate probe log recorded when
    /// `ContainerEngineLocator::locate` ran during setup (spec §4.B,
    /// §8 property 6), not a fresh ping.
    fn engine_report(&self) -> Response {
        match &self.engine_diagnostics {
            Some(diagnostics) => Response::EngineReport {
                endpoint: diagnostics.successful_candidate().map(|c| c.kind.clone()),
                attempts: diagnostics.attempts.len(),
            },
            None => Response::EngineReport { endpoint: None, attempts: 0 },
        }
    }

    fn services_list(&self) -> Response {
        let services = self
            .services
            .iter()
            .filter(|d| !d.excluded_on(self.os))
            .filter_map(|d| {
                self.watchdog.service_state(&d.key).map(|state| ServiceSummary {
                    key: d.key.clone(),
                    status: state.status,
                    last_check_at_ms: state.last_check_at_ms,
                    consecutive_failures: state.consecutive_failures,
                })
            })
            .collect();
        Response::ServicesList { services }
    }

    async fn services_action(&self, name: &ServiceKey, action: ServiceAction) -> Response {
        if *name == native_service_key() {
            return self.native_service_action(action).await;
        }
        let Some(def) = self.find_service(name).cloned() else {
            return Response::from_error(&ClaraError::validation(format!("unknown service {name}")));
        };
        let result = match action {
            ServiceAction::Start => self
                .controller
                .reconcile_one(&def, self.os, &self.network_name, &self.health_ctx)
                .await
                .map_err(|e| e.to_string()),
            ServiceAction::Restart => self.controller.restart(&def).await.map_err(|e| e.to_string()),
            ServiceAction::Stop => self.engine.stop_container(&def.container_name, 10).await.map_err(|e| e.to_string()),
            ServiceAction::Remove => self
                .engine
                .stop_container(&def.container_name, 10)
                .await
                .and_then(|()| futures_noop())
                .map_err(|e: clara_engine::EngineError| e.to_string())
                .and(self.engine.remove_container(&def.container_name, true).await.map_err(|e| e.to_string())),
        };
        ok_or_error(result)
    }

    async fn native_service_action(&self, action: ServiceAction) -> Response {
        use clara_watchdog::ServiceRestarter;
        let result = match action {
            ServiceAction::Start => self.native_process.start().await.map_err(|e| e.to_string()),
            ServiceAction::Stop | ServiceAction::Remove => self.native_process.stop().await.map_err(|e| e.to_string()),
            ServiceAction::Restart => self.native_process.restart(&native_service_key()).await.map_err(|e| e.to_string()),
        };
        ok_or_error(result)
    }

    async fn services_logs(&self, name: &ServiceKey, tail: usize) -> Response {
        if *name == native_service_key() {
            return Response::from_error(&ClaraError::validation("logs are not captured for the process-backed llm service"));
        }
        let Some(def) = self.find_service(name) else {
            return Response::from_error(&ClaraError::validation(format!("unknown service {name}")));
        };
        match self.engine.container_logs(&def.container_name, tail).await {
            Ok(lines) => Response::ServicesLogs { lines },
            Err(e) => Response::from_error(&ClaraError::transient(name.to_string(), e.to_string())),
        }
    }

    async fn services_stats(&self, name: &ServiceKey) -> Response {
        if *name == native_service_key() {
            return Response::ServicesStats { running: self.native_process.is_running().await };
        }
        let Some(def) = self.find_service(name) else {
            return Response::from_error(&ClaraError::validation(format!("unknown service {name}")));
        };
        let running = matches!(
            self.engine.inspect_container(&def.container_name).await,
            Ok(Some(info)) if info.state == ContainerState::Running
        );
        Response::ServicesStats { running }
    }

    async fn images_check_updates(&self) -> Response {
        let mut results = HashMap::new();
        for def in self.services.iter().filter(|d| !d.image_ref.is_empty()) {
            let outcome = match def.image_ref.rsplit_once(':') {
                Some((base, tag)) => UpdateChecker::new(&self.puller).check(base, tag, Arch::current()).await,
                None => clara_core::UpdateCheckOutcome::CheckFailed,
            };
            let text = match outcome {
                clara_core::UpdateCheckOutcome::UpToDate => "up_to_date",
                clara_core::UpdateCheckOutcome::UpdateAvailable => "update_available",
                clara_core::UpdateCheckOutcome::CheckFailed => "check_failed",
            };
            results.insert(def.image_ref.clone(), text.to_string());
        }
        Response::ImagesCheckUpdates { results }
    }

    async fn images_update(&self, names: Option<Vec<String>>) -> Response {
        use futures_util::StreamExt;
        let targets: Vec<&ServiceDef> = self
            .services
            .iter()
            .filter(|d| !d.image_ref.is_empty())
            .filter(|d| names.as_ref().is_none_or(|n| n.contains(&d.image_ref)))
            .collect();

        for def in targets {
            let stream = match self.puller.pull_stream(&def.image_ref).await {
                Ok(s) => s,
                Err(e) => return Response::from_error(&ClaraError::network(e.to_string())),
            };
            let mut stream = stream;
            while let Some(event) = stream.next().await {
                match event {
                    Ok(progress) => {
                        let _ = self.events.send(Event::ImagePullProgress {
                            image_ref: progress.image_ref,
                            status_text: progress.status_text,
                            percentage: progress.percentage,
                        });
                    }
                    Err(e) => return Response::from_error(&ClaraError::network(e.to_string())),
                }
            }
        }
        Response::Ok
    }

    async fn llm_regenerate_config(&self) -> Response {
        let models = self.native_process.list_models().await;
        let doc = NativeLlmConfigDocument { models, regenerated_at_ms: self.clock.epoch_ms() };
        let path = self.config.llamacpp_binaries_root().join("clara-llm-config.json");
        match clara_storage::save_json_atomic(&path, &doc) {
            Ok(()) => Response::Ok,
            Err(e) => Response::from_error(&ClaraError::validation(e.to_string())),
        }
    }

    async fn mcp_update(&self, name: &McpServerName, patch: McpServerPatch) -> Response {
        let Some(mut def) = self.mcp.get(name) else {
            return Response::from_error(&ClaraError::validation(format!("unknown mcp server {name}")));
        };
        if let Some(server_type) = patch.server_type {
            def.server_type = server_type;
        }
        if let Some(command) = patch.command {
            def.command = Some(command);
        }
        if let Some(args) = patch.args {
            def.args = args;
        }
        if let Some(env) = patch.env {
            def.env = env;
        }
        if let Some(url) = patch.url {
            def.url = Some(url);
        }
        if let Some(headers) = patch.headers {
            def.headers = headers;
        }
        if let Some(description) = patch.description {
            def.description = description;
        }
        if let Some(enabled) = patch.enabled {
            def.enabled = enabled;
        }
        def.updated_at_ms = Some(self.clock.epoch_ms());
        self.mcp.upsert(def);
        self.mcp.save_running_state().await;
        Response::Ok
    }

    fn mcp_diagnose(&self, name: &McpServerName) -> Response {
        let registered = self.mcp.get(name).is_some();
        let status = self.mcp.status(name);
        Response::McpDiagnoseRuntime {
            diagnosis: McpDiagnosis {
                name: name.clone(),
                registered,
                running: status.is_some(),
                status: status.map(|s| format!("{s:?}")),
            },
        }
    }

    async fn native_check_updates(&self) -> Response {
        match self.build_update_params().await {
            Some(params) => match clara_native_update::fetch_catalog(&self.engine_http_client(), &params.catalog_url).await {
                Ok(catalog) => {
                    let latest = clara_native_update::version_from_tag(&catalog.tag_name);
                    Response::NativeCheckUpdates { up_to_date: Some(latest) == self.current_native_version().await }
                }
                Err(e) => Response::from_error(&ClaraError::network(e.to_string())),
            },
            None => Response::from_error(&ClaraError::validation("native update is not configured")),
        }
    }

    async fn current_native_version(&self) -> Option<String> {
        self.version_store.read_version().await
    }

    fn engine_http_client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    async fn build_update_params(&self) -> Option<UpdateParams> {
        let cfg = &self.update_config;
        Some(UpdateParams {
            catalog_url: cfg.catalog_url.clone(),
            asset_pattern: cfg.asset_pattern.clone(),
            install_dir: cfg.install_dir.clone(),
            inventory: cfg.inventory.clone(),
            targets: cfg.targets.clone(),
            work_dir: cfg.work_dir.clone(),
            backup_root: cfg.backup_root.clone(),
            quiesce_process_names: cfg.quiesce_process_names.clone(),
            dependent_services: cfg.dependent_services.clone(),
            now_ms: self.clock.epoch_ms(),
        })
    }

    async fn native_update(&self) -> Response {
        let Some(params) = self.build_update_params().await else {
            return Response::from_error(&ClaraError::validation("native update is not configured"));
        };
        match self.native_updater.update(params).await {
            Ok(UpdateOutcome::UpToDate { .. }) => Response::Ok,
            Ok(UpdateOutcome::Updated { to, .. }) => {
                warn!(version = %to, "native llm binary updated");
                Response::Ok
            }
            Err(e) => Response::from_error(&ClaraError::validation(e.to_string())),
        }
    }
}

#[derive(serde::Serialize)]
struct NativeLlmConfigDocument {
    models: Vec<String>,
    regenerated_at_ms: u64,
}

fn ok_or_error(result: Result<(), String>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(message) => Response::Error { message },
    }
}

fn futures_noop() -> Result<(), clara_engine::EngineError> {
    Ok(())
}
