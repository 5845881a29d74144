// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires `bay-storage` + `bay-adapters` + `bay-engine` into the shared
//! state axum handlers close over.

use std::sync::Arc;

use bay_adapters::{Driver, DockerDriver};
use bay_core::{DriverType, Settings};
use bay_engine::{CapabilityRouter, IdempotencyService, SandboxManager, SessionManager, WorkspaceManager};
use bay_storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub sandboxes: Arc<SandboxManager>,
    pub router: Arc<CapabilityRouter>,
    pub idempotency: Arc<IdempotencyService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub async fn build(settings: Settings) -> Result<Self, anyhow::Error> {
        let db = Database::connect(&settings.database.url).await?;
        let driver = build_driver(&settings)?;

        let workspaces = WorkspaceManager::new(db.clone(), driver.clone(), settings.workspace.clone());
        let sessions = SessionManager::new(db.clone(), driver);
        let sandboxes = Arc::new(SandboxManager::new(db.clone(), workspaces, sessions, settings.clone()));
        let router = Arc::new(CapabilityRouter::new(sandboxes.clone()));
        let idempotency = Arc::new(IdempotencyService::new(db, settings.idempotency.clone()));

        Ok(Self { sandboxes, router, idempotency, settings: Arc::new(settings) })
    }
}

/// Only the Docker driver is implemented today; `K8sConfig` exists for
/// config-shape parity (see its doc comment) but selecting it is a
/// startup-time error rather than a silent fallback.
fn build_driver(settings: &Settings) -> Result<Arc<dyn Driver>, anyhow::Error> {
    match settings.driver.kind {
        DriverType::Docker => Ok(Arc::new(DockerDriver::new(&settings.driver.docker)?)),
        DriverType::K8s => Err(anyhow::anyhow!("driver.type = k8s is configured but no Kubernetes driver is implemented")),
    }
}
