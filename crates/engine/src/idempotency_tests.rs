// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bay_storage::Database;

async fn test_db() -> Database {
    Database::connect("sqlite::memory:").await.unwrap()
}

fn enabled_config() -> IdempotencyConfig {
    IdempotencyConfig { enabled: true, ttl_hours: 1 }
}

#[test]
fn validate_key_rejects_empty_and_overlong_and_bad_chars() {
    assert!(!IdempotencyService::validate_key(""));
    assert!(!IdempotencyService::validate_key(&"a".repeat(129)));
    assert!(!IdempotencyService::validate_key("has a space"));
    assert!(!IdempotencyService::validate_key("has/slash"));
    assert!(IdempotencyService::validate_key("abc-123_XYZ"));
    assert!(IdempotencyService::validate_key(&"a".repeat(128)));
}

#[test]
fn fingerprint_is_stable_and_sensitive_to_every_input() {
    let a = IdempotencyService::compute_fingerprint("/v1/sandboxes", "POST", "{}");
    let b = IdempotencyService::compute_fingerprint("/v1/sandboxes", "POST", "{}");
    assert_eq!(a, b);

    let different_body = IdempotencyService::compute_fingerprint("/v1/sandboxes", "POST", r#"{"a":1}"#);
    let different_method = IdempotencyService::compute_fingerprint("/v1/sandboxes", "GET", "{}");
    let different_path = IdempotencyService::compute_fingerprint("/v1/other", "POST", "{}");
    assert_ne!(a, different_body);
    assert_ne!(a, different_method);
    assert_ne!(a, different_path);
}

#[tokio::test]
async fn check_returns_none_when_disabled() {
    let svc = IdempotencyService::new(test_db().await, IdempotencyConfig { enabled: false, ttl_hours: 1 });
    let result = svc.check("acme", "some-key", "/v1/sandboxes", "POST", "{}").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn check_rejects_malformed_key_as_conflict() {
    let svc = IdempotencyService::new(test_db().await, enabled_config());
    let err = svc.check("acme", "bad key!", "/v1/sandboxes", "POST", "{}").await.unwrap_err();
    assert!(matches!(err, BayError::Conflict(_)));
}

#[tokio::test]
async fn check_is_none_when_no_record_exists() {
    let svc = IdempotencyService::new(test_db().await, enabled_config());
    let result = svc.check("acme", "fresh-key", "/v1/sandboxes", "POST", "{}").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn save_then_check_returns_the_cached_response() {
    let svc = IdempotencyService::new(test_db().await, enabled_config());
    svc.save("acme", "req-1", "/v1/sandboxes", "POST", "{}", r#"{"id":"sandbox-abc"}"#, 201)
        .await
        .unwrap();

    let cached = svc.check("acme", "req-1", "/v1/sandboxes", "POST", "{}").await.unwrap().unwrap();
    assert_eq!(cached.status_code, 201);
    assert_eq!(cached.response_snapshot, r#"{"id":"sandbox-abc"}"#);
}

#[tokio::test]
async fn check_rejects_key_reused_with_a_different_request_as_conflict() {
    let svc = IdempotencyService::new(test_db().await, enabled_config());
    svc.save("acme", "req-1", "/v1/sandboxes", "POST", "{}", r#"{"id":"sandbox-abc"}"#, 201)
        .await
        .unwrap();

    let err = svc
        .check("acme", "req-1", "/v1/sandboxes", "POST", r#"{"profile_id":"other"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, BayError::Conflict(_)));
}

#[tokio::test]
async fn keys_are_scoped_per_owner() {
    let svc = IdempotencyService::new(test_db().await, enabled_config());
    svc.save("acme", "shared-key", "/v1/sandboxes", "POST", "{}", r#"{"id":"sandbox-acme"}"#, 201)
        .await
        .unwrap();

    let result = svc.check("other-owner", "shared-key", "/v1/sandboxes", "POST", "{}").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn check_treats_expired_record_as_absent() {
    let db = test_db().await;
    db.save_idempotency_key("acme", "req-1", "fp", r#"{"id":"sandbox-abc"}"#, 201, chrono::Duration::seconds(-1))
        .await
        .unwrap();

    let svc = IdempotencyService::new(db, enabled_config());
    let result = svc.check("acme", "req-1", "/v1/sandboxes", "POST", "{}").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn cleanup_expired_sweeps_past_ttl_rows() {
    let db = test_db().await;
    db.save_idempotency_key("acme", "req-1", "fp", "{}", 201, chrono::Duration::seconds(-1)).await.unwrap();
    db.save_idempotency_key("acme", "req-2", "fp", "{}", 201, chrono::Duration::seconds(-1)).await.unwrap();

    let svc = IdempotencyService::new(db, enabled_config());
    let swept = svc.cleanup_expired().await.unwrap();
    assert_eq!(swept, 2);
}
