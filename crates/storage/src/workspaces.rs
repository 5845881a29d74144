// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace repository.

use sqlx::any::AnyRow;
use sqlx::Row;

use crate::{decode_datetime, encode_datetime, Database, StorageError, WorkspaceRow};

pub struct NewWorkspace<'a> {
    pub id: &'a str,
    pub owner: &'a str,
    pub managed: bool,
    pub managed_by_sandbox_id: Option<&'a str>,
    pub driver_ref: &'a str,
    pub size_limit_mb: i64,
}

impl Database {
    pub async fn create_workspace(&self, data: NewWorkspace<'_>) -> Result<WorkspaceRow, StorageError> {
        let created_at = encode_datetime(chrono::Utc::now());
        sqlx::query(
            "INSERT INTO workspaces (id, owner, managed, managed_by_sandbox_id, driver_ref, size_limit_mb, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(data.id)
        .bind(data.owner)
        .bind(data.managed)
        .bind(data.managed_by_sandbox_id)
        .bind(data.driver_ref)
        .bind(data.size_limit_mb)
        .bind(created_at)
        .execute(self.pool())
        .await?;

        self.get_workspace_by_id(data.id)
            .await?
            .ok_or_else(|| StorageError::MissingAfterWrite { what: format!("workspace {}", data.id) })
    }

    /// Fetch a workspace scoped to its owner (used by the API edge, which
    /// must never leak cross-tenant rows).
    pub async fn get_workspace(&self, id: &str, owner: &str) -> Result<Option<WorkspaceRow>, StorageError> {
        let row = sqlx::query("SELECT * FROM workspaces WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool())
            .await?;
        row.map(map_workspace).transpose()
    }

    /// Fetch by id only, for internal cross-references (e.g. cascading a
    /// managed workspace from its owning sandbox).
    pub async fn get_workspace_by_id(&self, id: &str) -> Result<Option<WorkspaceRow>, StorageError> {
        let row = sqlx::query("SELECT * FROM workspaces WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(map_workspace).transpose()
    }

    pub async fn delete_workspace(&self, id: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM workspaces WHERE id = ?").bind(id).execute(self.pool()).await?;
        Ok(())
    }
}

fn map_workspace(row: AnyRow) -> Result<WorkspaceRow, StorageError> {
    Ok(WorkspaceRow {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        managed: row.try_get("managed")?,
        managed_by_sandbox_id: row.try_get("managed_by_sandbox_id")?,
        driver_ref: row.try_get("driver_ref")?,
        size_limit_mb: row.try_get("size_limit_mb")?,
        created_at: decode_datetime(&row, "created_at")?,
    })
}

#[cfg(test)]
#[path = "workspaces_tests.rs"]
mod tests;
