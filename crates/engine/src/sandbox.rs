// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate over workspace + profile + current session. `ensure_running`
//! is the hard path: per-sandbox serialization plus a row lock re-read,
//! so concurrent callers promote at most one session per sandbox.

use bay_core::{BayError, BayResult, OwnerId, SandboxId, SandboxStatus, Settings};
use bay_storage::sandboxes::NewSandbox;
use bay_storage::{Database, SandboxRow, SessionRow};

use crate::convert::storage_err;
use crate::locks::SandboxLocks;
use crate::session::SessionManager;
use crate::workspace::WorkspaceManager;

pub struct SandboxManager {
    db: Database,
    workspaces: WorkspaceManager,
    sessions: SessionManager,
    locks: SandboxLocks,
    settings: Settings,
}

impl SandboxManager {
    pub fn new(
        db: Database,
        workspaces: WorkspaceManager,
        sessions: SessionManager,
        settings: Settings,
    ) -> Self {
        Self { db, workspaces, sessions, locks: SandboxLocks::new(), settings }
    }

    pub async fn create(
        &self,
        owner: &OwnerId,
        profile_id: &str,
        workspace_id: Option<&str>,
        ttl_seconds: Option<u64>,
    ) -> BayResult<SandboxRow> {
        let profile = self
            .settings
            .get_profile(profile_id)
            .ok_or_else(|| BayError::Validation(format!("unknown profile {profile_id}")))?;

        let id = SandboxId::new();
        let workspace_id = match workspace_id {
            Some(id) => {
                // Must already exist and be visible to this owner.
                self.workspaces.get_by_id(id).await?;
                id.to_string()
            }
            None => {
                let ws = self.workspaces.create_managed(owner, &id).await?;
                ws.id
            }
        };

        let expires_at = ttl_seconds
            .filter(|&s| s > 0)
            .map(|s| chrono::Utc::now() + chrono::Duration::seconds(s as i64));

        self.db
            .create_sandbox(NewSandbox {
                id: id.as_str(),
                owner: owner.as_str(),
                profile_id: &profile.id,
                workspace_id: &workspace_id,
                expires_at,
            })
            .await
            .map_err(storage_err)
    }

    pub async fn get(&self, id: &SandboxId, owner: &OwnerId) -> BayResult<SandboxRow> {
        self.db
            .get_sandbox(id.as_str(), owner.as_str())
            .await
            .map_err(storage_err)?
            .ok_or_else(|| BayError::not_found(format!("sandbox {id}")))
    }

    /// Keyset-paginated list. `status`, when given, is derived per row
    /// (it's never a stored column — see [`Self::status_of`]), so this
    /// walks the table a page at a time rather than filtering in SQL,
    /// peeking one row ahead once `limit` is filled to decide whether
    /// `next_cursor` should be `Some`.
    pub async fn list(
        &self,
        owner: &OwnerId,
        cursor: Option<&str>,
        limit: i64,
        status: Option<SandboxStatus>,
    ) -> BayResult<(Vec<SandboxRow>, Option<String>)> {
        let page_size = limit.max(1);
        let mut cursor = cursor.map(str::to_string);
        let mut matched: Vec<SandboxRow> = Vec::new();

        loop {
            let page = self.db.list_sandboxes(owner.as_str(), cursor.as_deref(), page_size).await.map_err(storage_err)?;
            if page.is_empty() {
                return Ok((matched, None));
            }
            let fetched = page.len() as i64;

            for row in page {
                cursor = Some(row.id.clone());
                let keep = match status {
                    Some(wanted) => {
                        let session = self.get_current_session(&row).await?;
                        Self::status_of(&row, session.as_ref()) == wanted
                    }
                    None => true,
                };
                if keep {
                    matched.push(row);
                }
                if matched.len() as i64 == limit {
                    let more =
                        !self.db.list_sandboxes(owner.as_str(), cursor.as_deref(), 1).await.map_err(storage_err)?.is_empty();
                    return Ok((matched, if more { cursor } else { None }));
                }
            }

            if fetched < page_size {
                return Ok((matched, None));
            }
        }
    }

    pub fn status_of(row: &SandboxRow, session: Option<&SessionRow>) -> SandboxStatus {
        if row.deleted_at.is_some() {
            return SandboxStatus::Deleted;
        }
        match session.map(|s| s.observed_state.as_str()) {
            None => SandboxStatus::Idle,
            Some("pending") | Some("starting") => SandboxStatus::Starting,
            Some("running") => SandboxStatus::Ready,
            _ => SandboxStatus::Stopped,
        }
    }

    pub async fn get_current_session(&self, sandbox: &SandboxRow) -> BayResult<Option<SessionRow>> {
        match &sandbox.current_session_id {
            Some(id) => self.db.get_session(id).await.map_err(storage_err),
            None => Ok(None),
        }
    }

    /// The hard path (spec §4.4): acquires the per-sandbox lock, re-reads
    /// the row inside a transaction (row-locked on Postgres), creates a
    /// session if none exists, and promotes it via `SessionManager`.
    pub async fn ensure_running(&self, owner: &OwnerId, sandbox_id: &SandboxId) -> BayResult<SessionRow> {
        let _guard = self.locks.acquire(sandbox_id.as_str()).await;

        let mut tx = self.db.begin().await.map_err(storage_err)?;
        let sandbox = self
            .db
            .get_sandbox_for_update(&mut tx, sandbox_id.as_str(), owner.as_str())
            .await
            .map_err(storage_err)?
            .ok_or_else(|| BayError::not_found(format!("sandbox {sandbox_id}")))?;

        let profile = self
            .settings
            .get_profile(&sandbox.profile_id)
            .ok_or_else(|| BayError::Internal(format!("sandbox references unknown profile {}", sandbox.profile_id)))?
            .clone();
        let workspace = self.workspaces.get_by_id(&sandbox.workspace_id).await?;

        let session = match &sandbox.current_session_id {
            Some(id) => self
                .db
                .get_session(id)
                .await
                .map_err(storage_err)?
                .ok_or_else(|| BayError::Internal(format!("current_session_id {id} has no row")))?,
            None => {
                let created = self.sessions.create(sandbox_id.as_str(), &profile).await?;
                self.db
                    .set_current_session_tx(&mut tx, sandbox_id.as_str(), Some(&created.id))
                    .await
                    .map_err(storage_err)?;
                created
            }
        };

        tx.commit().await.map_err(|e| storage_err(e.into()))?;

        let session = self.sessions.ensure_running(session, &workspace, owner.as_str(), &profile).await?;

        let idle_expires_at = if profile.idle_timeout > 0 {
            Some(chrono::Utc::now() + chrono::Duration::seconds(profile.idle_timeout as i64))
        } else {
            None
        };
        self.db.keepalive_sandbox(sandbox_id.as_str(), idle_expires_at).await.map_err(storage_err)?;

        Ok(session)
    }

    pub async fn keepalive(&self, owner: &OwnerId, sandbox_id: &SandboxId) -> BayResult<()> {
        let sandbox = self.get(sandbox_id, owner).await?;
        let profile = self
            .settings
            .get_profile(&sandbox.profile_id)
            .ok_or_else(|| BayError::Internal(format!("sandbox references unknown profile {}", sandbox.profile_id)))?;
        let idle_expires_at = if profile.idle_timeout > 0 {
            Some(chrono::Utc::now() + chrono::Duration::seconds(profile.idle_timeout as i64))
        } else {
            None
        };
        self.db.keepalive_sandbox(sandbox_id.as_str(), idle_expires_at).await.map_err(storage_err)
    }

    /// Idempotent: stopping a sandbox with no running session is a no-op.
    pub async fn stop(&self, owner: &OwnerId, sandbox_id: &SandboxId) -> BayResult<()> {
        self.get(sandbox_id, owner).await?;
        for session in self.db.list_sessions_for_sandbox(sandbox_id.as_str()).await.map_err(storage_err)? {
            let is_live = matches!(session.observed_state.as_str(), "pending" | "starting" | "running");
            if is_live {
                self.sessions.stop(session).await?;
            }
        }
        let mut tx = self.db.begin().await.map_err(storage_err)?;
        self.db.set_current_session_tx(&mut tx, sandbox_id.as_str(), None).await.map_err(storage_err)?;
        tx.commit().await.map_err(|e| storage_err(e.into()))?;
        self.db.keepalive_sandbox(sandbox_id.as_str(), None).await.map_err(storage_err)
    }

    /// Permanent: destroys every session, soft-deletes the sandbox, and
    /// cascades a managed workspace. Releases the in-process lock entry.
    pub async fn delete(&self, owner: &OwnerId, sandbox_id: &SandboxId) -> BayResult<()> {
        let sandbox = self.get(sandbox_id, owner).await?;
        for session in self.db.list_sessions_for_sandbox(sandbox_id.as_str()).await.map_err(storage_err)? {
            self.sessions.destroy(&session).await?;
        }
        self.db.soft_delete_sandbox(sandbox_id.as_str()).await.map_err(storage_err)?;

        let workspace = self.workspaces.get_by_id(&sandbox.workspace_id).await?;
        if workspace.managed {
            self.workspaces.delete_managed(&workspace).await?;
        }
        self.locks.cleanup(sandbox_id.as_str());
        Ok(())
    }
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
