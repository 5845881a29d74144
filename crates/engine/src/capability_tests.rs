// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bay_adapters::fake::arc_fake_driver;
use bay_core::{Settings, WorkspaceConfig};
use bay_storage::sessions::NewSession;
use bay_storage::Database;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_db() -> Database {
    Database::connect("sqlite::memory:").await.unwrap()
}

/// Builds a sandbox whose session is already `running` with `endpoint`
/// pointed at a wiremock server, so routing exercises the real `ShipClient`
/// without going through the (slow, network-dependent) readiness probe.
async fn seeded_router(meta_capabilities: serde_json::Value) -> (Arc<SandboxManager>, OwnerId, SandboxId, MockServer) {
    let db = test_db().await;
    let driver = arc_fake_driver();
    let workspaces = WorkspaceManager::new(db.clone(), driver.clone(), WorkspaceConfig::default());
    let sessions = SessionManager::new(db.clone(), driver);
    let sandbox_mgr = Arc::new(SandboxManager::new(db.clone(), workspaces, sessions, Settings::default()));

    let owner = OwnerId::new("acme");
    let sandbox = sandbox_mgr.create(&owner, "python-default", None, None).await.unwrap();
    let sandbox_id = SandboxId::from_string(&sandbox.id);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "runtime": {"name": "ship", "version": "1.0", "api_version": "v1"},
            "workspace": {"mount_path": "/workspace"},
            "capabilities": meta_capabilities,
        })))
        .mount(&server)
        .await;

    let session = db
        .create_session(NewSession {
            id: "sess-1",
            sandbox_id: &sandbox.id,
            runtime_type: "ship",
            profile_id: "python-default",
        })
        .await
        .unwrap();
    db.set_container_id(&session.id, "container-1").await.unwrap();
    db.set_endpoint(&session.id, Some(&server.uri())).await.unwrap();
    db.set_states(&session.id, "running", "running").await.unwrap();

    let mut tx = db.begin().await.unwrap();
    db.set_current_session_tx(&mut tx, &sandbox.id, Some(&session.id)).await.unwrap();
    tx.commit().await.unwrap();

    (sandbox_mgr, owner, sandbox_id, server)
}

#[tokio::test]
async fn exec_python_dispatches_through_ready_session() {
    let (sandbox_mgr, owner, sandbox_id, server) =
        seeded_router(json!({"python": true, "shell": true, "filesystem": true})).await;
    Mock::given(method("POST"))
        .and(path("/ipython/exec"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "output": {"text": "3\n"},
        })))
        .mount(&server)
        .await;

    let router = CapabilityRouter::new(sandbox_mgr);
    let outcome = router.exec_python(&owner, &sandbox_id, "print(1+2)", 10).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.output, "3\n");
}

#[tokio::test]
async fn capability_not_advertised_is_rejected_before_dispatch() {
    let (sandbox_mgr, owner, sandbox_id, _server) =
        seeded_router(json!({"python": true, "shell": false, "filesystem": true})).await;

    let router = CapabilityRouter::new(sandbox_mgr);
    let err = router.exec_shell(&owner, &sandbox_id, "echo hi", 10, None).await.unwrap_err();
    match err {
        BayError::CapabilityNotSupported { capability, available } => {
            assert_eq!(capability, "shell");
            assert!(available.contains(&"python".to_string()));
            assert!(!available.contains(&"shell".to_string()));
        }
        other => panic!("expected CapabilityNotSupported, got {other:?}"),
    }
}

#[tokio::test]
async fn adapter_is_cached_across_calls_to_the_same_endpoint() {
    let (sandbox_mgr, owner, sandbox_id, server) =
        seeded_router(json!({"python": true, "shell": true, "filesystem": true})).await;
    Mock::given(method("POST"))
        .and(path("/fs/read_file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "hi", "path": "/workspace/a", "size": 2})))
        .mount(&server)
        .await;

    let router = CapabilityRouter::new(sandbox_mgr);
    router.read_file(&owner, &sandbox_id, "/workspace/a").await.unwrap();
    router.read_file(&owner, &sandbox_id, "/workspace/a").await.unwrap();
    assert_eq!(router.adapters.lock().len(), 1);
}

#[tokio::test]
async fn upload_then_download_round_trips_through_ship_wire_format() {
    let (sandbox_mgr, owner, sandbox_id, server) =
        seeded_router(json!({"python": true, "shell": true, "filesystem": true})).await;
    Mock::given(method("POST"))
        .and(path("/fs/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "file_path": "/workspace/a.bin", "size": 3,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fs/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;

    let router = CapabilityRouter::new(sandbox_mgr);
    let size = router.upload_file(&owner, &sandbox_id, "/workspace/a.bin", vec![1, 2, 3]).await.unwrap();
    assert_eq!(size, 3);
    let bytes = router.download_file(&owner, &sandbox_id, "/workspace/a.bin").await.unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
}
