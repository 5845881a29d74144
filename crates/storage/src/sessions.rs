// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session repository.

use sqlx::any::AnyRow;
use sqlx::Row;

use crate::{decode_datetime, encode_datetime, Database, SessionRow, StorageError};

pub struct NewSession<'a> {
    pub id: &'a str,
    pub sandbox_id: &'a str,
    pub runtime_type: &'a str,
    pub profile_id: &'a str,
}

impl Database {
    /// Persists a brand new session in `pending`/`pending`. Does not touch
    /// the driver.
    pub async fn create_session(&self, data: NewSession<'_>) -> Result<SessionRow, StorageError> {
        let now = encode_datetime(chrono::Utc::now());
        sqlx::query(
            "INSERT INTO sessions (id, sandbox_id, runtime_type, profile_id, container_id, endpoint, \
             desired_state, observed_state, created_at, updated_at) \
             VALUES (?, ?, ?, ?, NULL, NULL, 'pending', 'pending', ?, ?)",
        )
        .bind(data.id)
        .bind(data.sandbox_id)
        .bind(data.runtime_type)
        .bind(data.profile_id)
        .bind(now.clone())
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_session(data.id)
            .await?
            .ok_or_else(|| StorageError::MissingAfterWrite { what: format!("session {}", data.id) })
    }

    pub async fn get_session(&self, id: &str) -> Result<Option<SessionRow>, StorageError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(map_session).transpose()
    }

    /// Set `desired_state`/`observed_state` together, as every transition
    /// in `EnsureRunning` does.
    pub async fn set_states(
        &self,
        id: &str,
        desired_state: &str,
        observed_state: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "UPDATE sessions SET desired_state = ?, observed_state = ?, updated_at = ? WHERE id = ?",
        )
        .bind(desired_state)
        .bind(observed_state)
        .bind(encode_datetime(chrono::Utc::now()))
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn set_container_id(&self, id: &str, container_id: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE sessions SET container_id = ?, updated_at = ? WHERE id = ?")
            .bind(container_id)
            .bind(encode_datetime(chrono::Utc::now()))
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn set_endpoint(&self, id: &str, endpoint: Option<&str>) -> Result<(), StorageError> {
        sqlx::query("UPDATE sessions SET endpoint = ?, updated_at = ? WHERE id = ?")
            .bind(endpoint)
            .bind(encode_datetime(chrono::Utc::now()))
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Clears `container_id` back to null, used when the driver reports a
    /// container as gone (`not_found`).
    pub async fn clear_container_id(&self, id: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE sessions SET container_id = NULL, updated_at = ? WHERE id = ?")
            .bind(encode_datetime(chrono::Utc::now()))
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_session(&self, id: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?").bind(id).execute(self.pool()).await?;
        Ok(())
    }

    pub async fn list_sessions_for_sandbox(&self, sandbox_id: &str) -> Result<Vec<SessionRow>, StorageError> {
        let rows = sqlx::query("SELECT * FROM sessions WHERE sandbox_id = ? ORDER BY created_at DESC")
            .bind(sandbox_id)
            .fetch_all(self.pool())
            .await?;
        rows.into_iter().map(map_session).collect()
    }
}

fn map_session(row: AnyRow) -> Result<SessionRow, StorageError> {
    Ok(SessionRow {
        id: row.try_get("id")?,
        sandbox_id: row.try_get("sandbox_id")?,
        runtime_type: row.try_get("runtime_type")?,
        profile_id: row.try_get("profile_id")?,
        container_id: row.try_get("container_id")?,
        endpoint: row.try_get("endpoint")?,
        desired_state: row.try_get("desired_state")?,
        observed_state: row.try_get("observed_state")?,
        created_at: decode_datetime(&row, "created_at")?,
        updated_at: decode_datetime(&row, "updated_at")?,
    })
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
