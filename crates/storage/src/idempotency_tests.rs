// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::Database;

async fn test_db() -> Database {
    Database::connect("sqlite::memory:").await.unwrap()
}

#[tokio::test]
async fn save_then_get_round_trips() {
    let db = test_db().await;
    db.save_idempotency_key(
        "acme",
        "key-1",
        "fingerprint-abc",
        r#"{"id":"sandbox-1"}"#,
        201,
        chrono::Duration::hours(1),
    )
    .await
    .unwrap();

    let record = db.get_idempotency_key("acme", "key-1").await.unwrap().unwrap();
    assert_eq!(record.status_code, 201);
    assert_eq!(record.response_snapshot, r#"{"id":"sandbox-1"}"#);
}

#[tokio::test]
async fn expired_key_is_treated_as_absent_and_swept() {
    let db = test_db().await;
    db.save_idempotency_key(
        "acme",
        "key-1",
        "fingerprint-abc",
        "{}",
        201,
        chrono::Duration::seconds(-1),
    )
    .await
    .unwrap();

    assert!(db.get_idempotency_key("acme", "key-1").await.unwrap().is_none());
    // get_idempotency_key lazily deletes; a second lookup still finds nothing.
    assert!(db.get_idempotency_key("acme", "key-1").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_save_is_first_writer_wins() {
    let db = test_db().await;
    db.save_idempotency_key("acme", "key-1", "fp-a", "first", 201, chrono::Duration::hours(1))
        .await
        .unwrap();
    // A second writer racing the same key must not error and must not
    // clobber the first writer's response.
    db.save_idempotency_key("acme", "key-1", "fp-a", "second", 201, chrono::Duration::hours(1))
        .await
        .unwrap();

    let record = db.get_idempotency_key("acme", "key-1").await.unwrap().unwrap();
    assert_eq!(record.response_snapshot, "first");
}

#[tokio::test]
async fn sweep_removes_only_expired_rows() {
    let db = test_db().await;
    db.save_idempotency_key("acme", "live", "fp", "{}", 200, chrono::Duration::hours(1))
        .await
        .unwrap();
    db.save_idempotency_key("acme", "dead", "fp", "{}", 200, chrono::Duration::seconds(-1))
        .await
        .unwrap();

    let swept = db.sweep_expired_idempotency_keys().await.unwrap();
    assert_eq!(swept, 1);
    assert!(db.get_idempotency_key("acme", "live").await.unwrap().is_some());
}
