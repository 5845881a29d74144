// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! At-most-once semantics for creation requests via a client-supplied key.
//!
//! `Check` is called before a mutating handler runs; `Save` after it
//! succeeds. A key reused against a different request (different method,
//! path, or body) is a conflict, not a cache hit.

use sha2::{Digest, Sha256};
use std::sync::OnceLock;

use bay_core::{BayError, BayResult, IdempotencyConfig};
use bay_storage::Database;

use crate::convert::storage_err;

#[allow(clippy::expect_used)]
fn key_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| regex::Regex::new(r"^[A-Za-z0-9_\-]{1,128}$").expect("constant regex pattern is valid"))
}

/// A previously-persisted response, returned verbatim to the caller on a
/// cache hit instead of re-running the handler.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub response_snapshot: String,
    pub status_code: i32,
}

pub struct IdempotencyService {
    db: Database,
    config: IdempotencyConfig,
}

impl IdempotencyService {
    pub fn new(db: Database, config: IdempotencyConfig) -> Self {
        Self { db, config }
    }

    pub fn validate_key(key: &str) -> bool {
        key_pattern().is_match(key)
    }

    pub fn compute_fingerprint(path: &str, method: &str, body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(method.as_bytes());
        hasher.update(b":");
        hasher.update(path.as_bytes());
        hasher.update(b":");
        hasher.update(body.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns `None` when the request should proceed (disabled, no prior
    /// record, or a lazily-expired one); `Some` on a genuine cache hit.
    /// A reused key against a different request is a `Conflict`, not a hit.
    pub async fn check(
        &self,
        owner: &str,
        key: &str,
        path: &str,
        method: &str,
        body: &str,
    ) -> BayResult<Option<CachedResponse>> {
        if !self.config.enabled {
            return Ok(None);
        }
        if !Self::validate_key(key) {
            return Err(BayError::Conflict(format!("invalid idempotency key {key:?}")));
        }

        let record = match self.db.get_idempotency_key(owner, key).await.map_err(storage_err)? {
            Some(record) => record,
            None => return Ok(None),
        };

        let fingerprint = Self::compute_fingerprint(path, method, body);
        if fingerprint != record.request_fingerprint {
            return Err(BayError::Conflict(format!(
                "idempotency key {key} reused with a different request"
            )));
        }

        Ok(Some(CachedResponse {
            response_snapshot: record.response_snapshot,
            status_code: record.status_code,
        }))
    }

    /// Best-effort: a unique-constraint race with a concurrent `Save` for
    /// the same key is swallowed by `bay-storage`, since the loser already
    /// has its own valid response to return.
    pub async fn save(
        &self,
        owner: &str,
        key: &str,
        path: &str,
        method: &str,
        body: &str,
        response_snapshot: &str,
        status_code: i32,
    ) -> BayResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let fingerprint = Self::compute_fingerprint(path, method, body);
        let ttl = chrono::Duration::hours(self.config.ttl_hours as i64);
        self.db
            .save_idempotency_key(owner, key, &fingerprint, response_snapshot, status_code, ttl)
            .await
            .map_err(storage_err)
    }

    /// Bulk housekeeping; `Check` already performs lazy per-key expiry, so
    /// correctness never depends on this running.
    pub async fn cleanup_expired(&self) -> BayResult<u64> {
        self.db.sweep_expired_idempotency_keys().await.map_err(storage_err)
    }
}

#[cfg(test)]
#[path = "idempotency_tests.rs"]
mod tests;
