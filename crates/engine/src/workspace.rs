// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volume-backed workspace lifecycle and ownership.

use std::collections::HashMap;
use std::sync::Arc;

use bay_adapters::Driver;
use bay_core::{BayError, BayResult, OwnerId, SandboxId, WorkspaceConfig, WorkspaceId};
use bay_storage::workspaces::NewWorkspace;
use bay_storage::{Database, WorkspaceRow};

use crate::convert::{driver_err, storage_err};

pub struct WorkspaceManager {
    db: Database,
    driver: Arc<dyn Driver>,
    config: WorkspaceConfig,
}

fn driver_ref_for(id: &WorkspaceId) -> String {
    format!("bay-workspace-{id}")
}

impl WorkspaceManager {
    pub fn new(db: Database, driver: Arc<dyn Driver>, config: WorkspaceConfig) -> Self {
        Self { db, driver, config }
    }

    /// Create an external workspace, owned directly by `owner` and
    /// surviving any sandbox that attaches it.
    pub async fn create(&self, owner: &OwnerId, size_limit_mb: Option<u64>) -> BayResult<WorkspaceRow> {
        self.create_inner(owner, false, None, size_limit_mb).await
    }

    /// Create a managed workspace, cascade-deleted with the sandbox that
    /// owns it. Not part of the public API surface; called by
    /// `SandboxManager::create`.
    pub async fn create_managed(
        &self,
        owner: &OwnerId,
        sandbox_id: &SandboxId,
    ) -> BayResult<WorkspaceRow> {
        self.create_inner(owner, true, Some(sandbox_id.as_str()), None).await
    }

    async fn create_inner(
        &self,
        owner: &OwnerId,
        managed: bool,
        managed_by_sandbox_id: Option<&str>,
        size_limit_mb: Option<u64>,
    ) -> BayResult<WorkspaceRow> {
        let id = WorkspaceId::new();
        let driver_ref = driver_ref_for(&id);
        let size_limit_mb = size_limit_mb.unwrap_or(self.config.default_size_limit_mb) as i64;

        let mut labels = HashMap::new();
        labels.insert("bay.owner".to_string(), owner.to_string());
        labels.insert("bay.workspace_id".to_string(), id.to_string());
        self.driver.create_volume(&driver_ref, labels).await.map_err(driver_err)?;

        self.db
            .create_workspace(NewWorkspace {
                id: id.as_str(),
                owner: owner.as_str(),
                managed,
                managed_by_sandbox_id,
                driver_ref: &driver_ref,
                size_limit_mb,
            })
            .await
            .map_err(storage_err)
    }

    pub async fn get(&self, id: &WorkspaceId, owner: &OwnerId) -> BayResult<WorkspaceRow> {
        self.db
            .get_workspace(id.as_str(), owner.as_str())
            .await
            .map_err(storage_err)?
            .ok_or_else(|| BayError::not_found(format!("workspace {id}")))
    }

    pub async fn get_by_id(&self, id: &str) -> BayResult<WorkspaceRow> {
        self.db
            .get_workspace_by_id(id)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| BayError::not_found(format!("workspace {id}")))
    }

    /// Refuses to delete a managed workspace unless `force` — managed
    /// workspaces are only meant to be cascaded from sandbox deletion.
    pub async fn delete(&self, id: &WorkspaceId, owner: &OwnerId, force: bool) -> BayResult<()> {
        let row = self.get(id, owner).await?;
        if row.managed && !force {
            return Err(BayError::Conflict(
                "managed workspace cannot be deleted directly".to_string(),
            ));
        }
        self.destroy_row(&row).await
    }

    /// Cascade path from `SandboxManager::delete`: no owner check, since
    /// the caller already holds an owner-scoped sandbox row.
    pub(crate) async fn delete_managed(&self, row: &WorkspaceRow) -> BayResult<()> {
        self.destroy_row(row).await
    }

    async fn destroy_row(&self, row: &WorkspaceRow) -> BayResult<()> {
        self.driver.delete_volume(&row.driver_ref).await.map_err(driver_err)?;
        self.db.delete_workspace(&row.id).await.map_err(storage_err)
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
