// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotency-key repository.

use sqlx::any::AnyRow;
use sqlx::Row;

use crate::{decode_datetime, encode_datetime, Database, IdempotencyKeyRow, StorageError};

impl Database {
    /// Looks up `(owner, key)`. Expired rows are treated as absent and
    /// lazily deleted rather than surfaced.
    pub async fn get_idempotency_key(
        &self,
        owner: &str,
        key: &str,
    ) -> Result<Option<IdempotencyKeyRow>, StorageError> {
        let row = sqlx::query("SELECT * FROM idempotency_keys WHERE owner = ? AND key = ?")
            .bind(owner)
            .bind(key)
            .fetch_optional(self.pool())
            .await?;
        let Some(row) = row else { return Ok(None) };
        let record = map_idempotency_key(row)?;

        if record.expires_at <= chrono::Utc::now() {
            self.delete_idempotency_key(owner, key).await?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Insert a new idempotency record. Races are first-writer-wins: a
    /// unique-constraint violation on `(owner, key)` is swallowed, since
    /// the loser's caller already has its own valid response to return.
    pub async fn save_idempotency_key(
        &self,
        owner: &str,
        key: &str,
        request_fingerprint: &str,
        response_snapshot: &str,
        status_code: i32,
        ttl: chrono::Duration,
    ) -> Result<(), StorageError> {
        let now = chrono::Utc::now();
        let expires_at = now + ttl;
        let result = sqlx::query(
            "INSERT INTO idempotency_keys (owner, key, request_fingerprint, response_snapshot, \
             status_code, created_at, expires_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(owner)
        .bind(key)
        .bind(request_fingerprint)
        .bind(response_snapshot)
        .bind(status_code)
        .bind(encode_datetime(now))
        .bind(encode_datetime(expires_at))
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let storage_err = StorageError::from(err);
                if storage_err.is_unique_violation() {
                    Ok(())
                } else {
                    Err(storage_err)
                }
            }
        }
    }

    pub async fn delete_idempotency_key(&self, owner: &str, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM idempotency_keys WHERE owner = ? AND key = ?")
            .bind(owner)
            .bind(key)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Sweep rows past their TTL. Best-effort housekeeping; correctness
    /// does not depend on this ever running, since `get_idempotency_key`
    /// already treats expired rows as absent.
    pub async fn sweep_expired_idempotency_keys(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM idempotency_keys WHERE expires_at <= ?")
            .bind(encode_datetime(chrono::Utc::now()))
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

fn map_idempotency_key(row: AnyRow) -> Result<IdempotencyKeyRow, StorageError> {
    Ok(IdempotencyKeyRow {
        owner: row.try_get("owner")?,
        key: row.try_get("key")?,
        request_fingerprint: row.try_get("request_fingerprint")?,
        response_snapshot: row.try_get("response_snapshot")?,
        status_code: row.try_get("status_code")?,
        created_at: decode_datetime(&row, "created_at")?,
        expires_at: decode_datetime(&row, "expires_at")?,
    })
}

#[cfg(test)]
#[path = "idempotency_tests.rs"]
mod tests;
