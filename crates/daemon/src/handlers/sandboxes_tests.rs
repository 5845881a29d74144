// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bay_adapters::fake::arc_fake_driver;
use bay_core::{IdempotencyConfig, Settings, WorkspaceConfig};
use bay_engine::{CapabilityRouter, IdempotencyService, SandboxManager, SessionManager, WorkspaceManager};
use bay_storage::Database;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::server::build_router;
use crate::state::AppState;

async fn test_state() -> Arc<AppState> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let driver = arc_fake_driver();
    let workspaces = WorkspaceManager::new(db.clone(), driver.clone(), WorkspaceConfig::default());
    let sessions = SessionManager::new(db.clone(), driver);
    let settings = Settings::default();
    let sandboxes = Arc::new(SandboxManager::new(db.clone(), workspaces, sessions, settings.clone()));
    let router = Arc::new(CapabilityRouter::new(sandboxes.clone()));
    let idempotency = Arc::new(IdempotencyService::new(db, IdempotencyConfig { enabled: true, ..settings.idempotency.clone() }));
    Arc::new(AppState { sandboxes, router, idempotency, settings: Arc::new(settings) })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_sandbox_returns_201_with_repr() {
    let app = build_router(test_state().await);
    let req = Request::post("/v1/sandboxes")
        .header("content-type", "application/json")
        .header("x-owner", "acme")
        .body(Body::from(json!({"profile": "python-default", "ttl": 3600}).to_string()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["profile"], "python-default");
    assert_eq!(body["status"], "idle");
    assert!(body["capabilities"].as_array().unwrap().contains(&json!("python")));
}

#[tokio::test]
async fn create_sandbox_replays_cached_response_for_same_idempotency_key() {
    let app = build_router(test_state().await);
    let make_request = || {
        Request::post("/v1/sandboxes")
            .header("content-type", "application/json")
            .header("x-owner", "acme")
            .header("idempotency-key", "create-once")
            .body(Body::from(json!({"profile": "python-default", "ttl": 3600}).to_string()))
            .unwrap()
    };

    let first = app.clone().oneshot(make_request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_body = body_json(first).await;

    let second = app.oneshot(make_request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);
    let second_body = body_json(second).await;

    assert_eq!(first_body["id"], second_body["id"]);
}

#[tokio::test]
async fn create_sandbox_rejects_reused_key_with_different_body() {
    let app = build_router(test_state().await);
    let req1 = Request::post("/v1/sandboxes")
        .header("content-type", "application/json")
        .header("x-owner", "acme")
        .header("idempotency-key", "shared-key")
        .body(Body::from(json!({"profile": "python-default", "ttl": 3600}).to_string()))
        .unwrap();
    let first = app.clone().oneshot(req1).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let req2 = Request::post("/v1/sandboxes")
        .header("content-type", "application/json")
        .header("x-owner", "acme")
        .header("idempotency-key", "shared-key")
        .body(Body::from(json!({"profile": "python-data", "ttl": 60}).to_string()))
        .unwrap();
    let second = app.oneshot(req2).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_sandbox_rejects_unknown_profile() {
    let app = build_router(test_state().await);
    let req = Request::post("/v1/sandboxes")
        .header("content-type", "application/json")
        .header("x-owner", "acme")
        .body(Body::from(json!({"profile": "no-such-profile"}).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn list_then_get_then_stop_then_delete_round_trips() {
    let app = build_router(test_state().await);

    let create_req = Request::post("/v1/sandboxes")
        .header("content-type", "application/json")
        .header("x-owner", "acme")
        .body(Body::from(json!({"profile": "python-default"}).to_string()))
        .unwrap();
    let created = body_json(app.clone().oneshot(create_req).await.unwrap()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let list_req =
        Request::get("/v1/sandboxes").header("x-owner", "acme").body(Body::empty()).unwrap();
    let listed = body_json(app.clone().oneshot(list_req).await.unwrap()).await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let get_req = Request::get(format!("/v1/sandboxes/{id}"))
        .header("x-owner", "acme")
        .body(Body::empty())
        .unwrap();
    let fetched = body_json(app.clone().oneshot(get_req).await.unwrap()).await;
    assert_eq!(fetched["id"], id);

    let stop_req = Request::post(format!("/v1/sandboxes/{id}/stop"))
        .header("x-owner", "acme")
        .body(Body::empty())
        .unwrap();
    let stopped = app.clone().oneshot(stop_req).await.unwrap();
    assert_eq!(stopped.status(), StatusCode::OK);

    let delete_req = Request::delete(format!("/v1/sandboxes/{id}"))
        .header("x-owner", "acme")
        .body(Body::empty())
        .unwrap();
    let deleted = app.oneshot(delete_req).await.unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn list_sandboxes_filters_by_status_query_param() {
    let app = build_router(test_state().await);
    let create_req = Request::post("/v1/sandboxes")
        .header("content-type", "application/json")
        .header("x-owner", "acme")
        .body(Body::from(json!({"profile": "python-default"}).to_string()))
        .unwrap();
    app.clone().oneshot(create_req).await.unwrap();

    let idle_req =
        Request::get("/v1/sandboxes?status=idle").header("x-owner", "acme").body(Body::empty()).unwrap();
    let idle = body_json(app.clone().oneshot(idle_req).await.unwrap()).await;
    assert_eq!(idle["items"].as_array().unwrap().len(), 1);

    let ready_req =
        Request::get("/v1/sandboxes?status=ready").header("x-owner", "acme").body(Body::empty()).unwrap();
    let ready = body_json(app.oneshot(ready_req).await.unwrap()).await;
    assert!(ready["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn get_sandbox_for_wrong_owner_is_not_found() {
    let app = build_router(test_state().await);
    let create_req = Request::post("/v1/sandboxes")
        .header("content-type", "application/json")
        .header("x-owner", "acme")
        .body(Body::from(json!({"profile": "python-default"}).to_string()))
        .unwrap();
    let created = body_json(app.clone().oneshot(create_req).await.unwrap()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let get_req = Request::get(format!("/v1/sandboxes/{id}"))
        .header("x-owner", "someone-else")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(get_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
