// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bay_adapters::fake::arc_fake_driver;
use bay_core::ProfileConfig;
use bay_storage::workspaces::NewWorkspace;

async fn test_db() -> Database {
    Database::connect("sqlite::memory:").await.unwrap()
}

fn profile() -> ProfileConfig {
    ProfileConfig { id: "python-default".to_string(), ..ProfileConfig::default() }
}

async fn workspace(db: &Database) -> WorkspaceRow {
    db.create_workspace(NewWorkspace {
        id: "ws-1",
        owner: "acme",
        managed: true,
        managed_by_sandbox_id: Some("sandbox-1"),
        driver_ref: "bay-workspace-ws-1",
        size_limit_mb: 1024,
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn create_is_pending_and_does_not_touch_driver() {
    let db = test_db().await;
    let driver = arc_fake_driver();
    let mgr = SessionManager::new(db, driver.clone());

    let session = mgr.create("sandbox-1", &profile()).await.unwrap();
    assert_eq!(session.observed_state, "pending");
    assert!(session.container_id.is_none());
}

#[tokio::test]
async fn ensure_running_on_already_ready_session_is_a_noop() {
    let db = test_db().await;
    let driver = arc_fake_driver();
    let mgr = SessionManager::new(db.clone(), driver.clone());
    let mut session = mgr.create("sandbox-1", &profile()).await.unwrap();
    db.set_states(&session.id, "running", "running").await.unwrap();
    db.set_endpoint(&session.id, Some("http://existing:8123")).await.unwrap();
    session = db.get_session(&session.id).await.unwrap().unwrap();

    let ws = workspace(&db).await;
    let result = mgr.ensure_running(session.clone(), &ws, "acme", &profile()).await.unwrap();
    assert_eq!(result.endpoint, session.endpoint);
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn ensure_running_on_starting_session_is_not_ready() {
    let db = test_db().await;
    let driver = arc_fake_driver();
    let mgr = SessionManager::new(db.clone(), driver);
    let session = mgr.create("sandbox-1", &profile()).await.unwrap();
    db.set_states(&session.id, "running", "starting").await.unwrap();
    let session = db.get_session(&session.id).await.unwrap().unwrap();

    let ws = workspace(&db).await;
    let err = mgr.ensure_running(session, &ws, "acme", &profile()).await.unwrap_err();
    match err {
        BayError::SessionNotReady { retry_after_ms, .. } => assert_eq!(retry_after_ms, 1000),
        other => panic!("expected SessionNotReady, got {other:?}"),
    }
}

#[tokio::test]
async fn stop_clears_endpoint_and_stops_driver() {
    let db = test_db().await;
    let driver = arc_fake_driver();
    let mgr = SessionManager::new(db.clone(), driver.clone());
    let session = mgr.create("sandbox-1", &profile()).await.unwrap();
    db.set_container_id(&session.id, "fake-container-1").await.unwrap();
    let session = db.get_session(&session.id).await.unwrap().unwrap();

    let stopped = mgr.stop(session).await.unwrap();
    assert_eq!(stopped.observed_state, "stopped");
    assert!(stopped.endpoint.is_none());
    assert!(driver.calls().iter().any(|c| c.starts_with("stop:")));
}

#[tokio::test]
async fn destroy_without_container_id_only_deletes_row() {
    let db = test_db().await;
    let driver = arc_fake_driver();
    let mgr = SessionManager::new(db.clone(), driver.clone());
    let session = mgr.create("sandbox-1", &profile()).await.unwrap();

    mgr.destroy(&session).await.unwrap();
    assert!(db.get_session(&session.id).await.unwrap().is_none());
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn refresh_status_clears_container_id_when_driver_reports_not_found() {
    let db = test_db().await;
    let driver = arc_fake_driver();
    let mgr = SessionManager::new(db.clone(), driver);
    let session = mgr.create("sandbox-1", &profile()).await.unwrap();
    db.set_container_id(&session.id, "ghost-container").await.unwrap();
    let session = db.get_session(&session.id).await.unwrap().unwrap();

    let refreshed = mgr.refresh_status(session, Some(8123)).await.unwrap();
    assert_eq!(refreshed.observed_state, "stopped");
    assert!(refreshed.container_id.is_none());
}
