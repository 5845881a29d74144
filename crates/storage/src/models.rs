// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row types mirroring the schema in `migrations/`.
//!
//! These are plain data, mapped by hand in each repository module rather
//! than derived, since `AnyRow` column decoding needs a little massaging
//! (timestamps are stored as RFC3339 text on both backends; booleans vary
//! in wire representation between SQLite and Postgres).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRow {
    pub id: String,
    pub owner: String,
    pub managed: bool,
    pub managed_by_sandbox_id: Option<String>,
    pub driver_ref: String,
    pub size_limit_mb: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxRow {
    pub id: String,
    pub owner: String,
    pub profile_id: String,
    pub workspace_id: String,
    pub current_session_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub idle_expires_at: Option<DateTime<Utc>>,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: String,
    pub sandbox_id: String,
    pub runtime_type: String,
    pub profile_id: String,
    pub container_id: Option<String>,
    pub endpoint: Option<String>,
    pub desired_state: String,
    pub observed_state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyKeyRow {
    pub owner: String,
    pub key: String,
    pub request_fingerprint: String,
    pub response_snapshot: String,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
