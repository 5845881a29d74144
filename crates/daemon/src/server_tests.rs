// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bay_core::{IdempotencyConfig, Settings, WorkspaceConfig};
use bay_engine::{CapabilityRouter, IdempotencyService, SandboxManager, SessionManager, WorkspaceManager};
use bay_storage::Database;
use tower::ServiceExt;

use super::build_router;
use crate::state::AppState;

async fn test_state() -> Arc<AppState> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let driver = bay_adapters::fake::arc_fake_driver();
    let workspaces = WorkspaceManager::new(db.clone(), driver.clone(), WorkspaceConfig::default());
    let sessions = SessionManager::new(db.clone(), driver);
    let settings = Settings::default();
    let sandboxes = Arc::new(SandboxManager::new(db.clone(), workspaces, sessions, settings.clone()));
    let router = Arc::new(CapabilityRouter::new(sandboxes.clone()));
    let idempotency =
        Arc::new(IdempotencyService::new(db, IdempotencyConfig { enabled: true, ..settings.idempotency.clone() }));
    Arc::new(AppState { sandboxes, router, idempotency, settings: Arc::new(settings) })
}

#[tokio::test]
async fn healthz_returns_200() {
    let app = build_router(test_state().await);
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = build_router(test_state().await);
    let response = app
        .oneshot(Request::get("/v1/does-not-exist").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
