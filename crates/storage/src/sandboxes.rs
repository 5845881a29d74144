// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox repository.
//!
//! `ensure_running`'s critical section (spec §4.4) needs a lock that
//! survives a re-read of the row: [`Database::begin`] plus
//! [`Database::get_sandbox_for_update`] give the caller a transaction that,
//! on Postgres, holds `SELECT ... FOR UPDATE` until commit. SQLite has no
//! row locks, so there the transaction alone does nothing for concurrent
//! *processes* — the per-sandbox in-memory mutex in `bay-engine` is what
//! actually serializes same-process callers in that case.

use sqlx::any::AnyRow;
use sqlx::{Any, Row, Transaction};

use crate::{decode_datetime, decode_optional_datetime, encode_optional_datetime, Database, Dialect, SandboxRow, StorageError};

pub struct NewSandbox<'a> {
    pub id: &'a str,
    pub owner: &'a str,
    pub profile_id: &'a str,
    pub workspace_id: &'a str,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Database {
    pub async fn begin(&self) -> Result<Transaction<'_, Any>, StorageError> {
        Ok(self.pool().begin().await?)
    }

    pub async fn create_sandbox(&self, data: NewSandbox<'_>) -> Result<SandboxRow, StorageError> {
        let now = chrono::Utc::now();
        let now_str = crate::encode_datetime(now);
        sqlx::query(
            "INSERT INTO sandboxes (id, owner, profile_id, workspace_id, current_session_id, \
             expires_at, idle_expires_at, last_active_at, created_at, deleted_at) \
             VALUES (?, ?, ?, ?, NULL, ?, NULL, ?, ?, NULL)",
        )
        .bind(data.id)
        .bind(data.owner)
        .bind(data.profile_id)
        .bind(data.workspace_id)
        .bind(encode_optional_datetime(data.expires_at))
        .bind(now_str.clone())
        .bind(now_str)
        .execute(self.pool())
        .await?;

        self.get_sandbox(data.id, data.owner)
            .await?
            .ok_or_else(|| StorageError::MissingAfterWrite { what: format!("sandbox {}", data.id) })
    }

    /// Owner-scoped fetch; soft-deleted rows are invisible.
    pub async fn get_sandbox(&self, id: &str, owner: &str) -> Result<Option<SandboxRow>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM sandboxes WHERE id = ? AND owner = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool())
        .await?;
        row.map(map_sandbox).transpose()
    }

    /// Re-read the sandbox row inside `tx`, taking a row lock on Postgres.
    /// Used by `ensure_running`'s critical section after acquiring the
    /// per-sandbox in-process mutex.
    pub async fn get_sandbox_for_update(
        &self,
        tx: &mut Transaction<'_, Any>,
        id: &str,
        owner: &str,
    ) -> Result<Option<SandboxRow>, StorageError> {
        let query = match self.dialect() {
            Dialect::Postgres => {
                "SELECT * FROM sandboxes WHERE id = ? AND owner = ? AND deleted_at IS NULL FOR UPDATE"
            }
            Dialect::Sqlite => "SELECT * FROM sandboxes WHERE id = ? AND owner = ? AND deleted_at IS NULL",
        };
        let row = sqlx::query(query).bind(id).bind(owner).fetch_optional(&mut **tx).await?;
        row.map(map_sandbox).transpose()
    }

    pub async fn set_current_session_tx(
        &self,
        tx: &mut Transaction<'_, Any>,
        sandbox_id: &str,
        session_id: Option<&str>,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE sandboxes SET current_session_id = ? WHERE id = ?")
            .bind(session_id)
            .bind(sandbox_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn touch_session_started_tx(
        &self,
        tx: &mut Transaction<'_, Any>,
        sandbox_id: &str,
        idle_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE sandboxes SET idle_expires_at = ?, last_active_at = ? WHERE id = ?")
            .bind(encode_optional_datetime(idle_expires_at))
            .bind(crate::encode_datetime(chrono::Utc::now()))
            .bind(sandbox_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Keepalive: extends `idle_expires_at` only, never `expires_at`.
    pub async fn keepalive_sandbox(
        &self,
        sandbox_id: &str,
        idle_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE sandboxes SET idle_expires_at = ?, last_active_at = ? WHERE id = ?")
            .bind(encode_optional_datetime(idle_expires_at))
            .bind(crate::encode_datetime(chrono::Utc::now()))
            .bind(sandbox_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn soft_delete_sandbox(&self, sandbox_id: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE sandboxes SET deleted_at = ? WHERE id = ?")
            .bind(crate::encode_datetime(chrono::Utc::now()))
            .bind(sandbox_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Keyset-paginated list, newest first. `cursor` is the RFC3339
    /// `created_at` of the last row seen.
    pub async fn list_sandboxes(
        &self,
        owner: &str,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SandboxRow>, StorageError> {
        let rows = match cursor {
            Some(cursor) => {
                sqlx::query(
                    "SELECT * FROM sandboxes WHERE owner = ? AND deleted_at IS NULL AND created_at < ? \
                     ORDER BY created_at DESC LIMIT ?",
                )
                .bind(owner)
                .bind(cursor)
                .bind(limit)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT * FROM sandboxes WHERE owner = ? AND deleted_at IS NULL \
                     ORDER BY created_at DESC LIMIT ?",
                )
                .bind(owner)
                .bind(limit)
                .fetch_all(self.pool())
                .await?
            }
        };
        rows.into_iter().map(map_sandbox).collect()
    }
}

fn map_sandbox(row: AnyRow) -> Result<SandboxRow, StorageError> {
    Ok(SandboxRow {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        profile_id: row.try_get("profile_id")?,
        workspace_id: row.try_get("workspace_id")?,
        current_session_id: row.try_get("current_session_id")?,
        expires_at: decode_optional_datetime(&row, "expires_at")?,
        idle_expires_at: decode_optional_datetime(&row, "idle_expires_at")?,
        last_active_at: decode_datetime(&row, "last_active_at")?,
        created_at: decode_datetime(&row, "created_at")?,
        deleted_at: decode_optional_datetime(&row, "deleted_at")?,
    })
}

#[cfg(test)]
#[path = "sandboxes_tests.rs"]
mod tests;
