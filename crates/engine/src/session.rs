// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session container-record lifecycle: `EnsureRunning`'s promotion state
//! machine and the runtime readiness probe.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bay_adapters::{ContainerStatus, CreateSpec, Driver};
use bay_core::{BayError, BayResult, ProfileConfig, SessionId, SessionState};
use bay_storage::sessions::NewSession;
use bay_storage::{Database, SessionRow, WorkspaceRow};

use crate::convert::{driver_err, storage_err};

/// Exponential backoff bounds for polling the runtime's `/health`
/// endpoint after `Driver::start`. Ported verbatim from the timing the
/// original control plane uses (`_wait_for_ready`).
const PROBE_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
const PROBE_MAX_INTERVAL: Duration = Duration::from_secs(1);
const PROBE_BACKOFF_FACTOR: f64 = 2.0;
const PROBE_MAX_WAIT: Duration = Duration::from_secs(120);
const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct SessionManager {
    db: Database,
    driver: Arc<dyn Driver>,
    http: reqwest::Client,
}

impl SessionManager {
    pub fn new(db: Database, driver: Arc<dyn Driver>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(PROBE_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { db, driver, http }
    }

    /// Persists a brand new session in `pending`/`pending`. Does not touch
    /// the driver.
    pub async fn create(&self, sandbox_id: &str, profile: &ProfileConfig) -> BayResult<SessionRow> {
        let id = SessionId::new();
        self.db
            .create_session(NewSession {
                id: id.as_str(),
                sandbox_id,
                runtime_type: &profile.runtime_type,
                profile_id: &profile.id,
            })
            .await
            .map_err(storage_err)
    }

    fn is_ready(session: &SessionRow) -> bool {
        session.observed_state == SessionState::Running.to_string() && session.endpoint.is_some()
    }

    /// Idempotent promotion to a running, ready container. Callers must
    /// already hold whatever external serialization is needed for this
    /// sandbox (`SandboxManager` owns that); this method itself assumes
    /// single-flight access to `session`.
    pub async fn ensure_running(
        &self,
        session: SessionRow,
        workspace: &WorkspaceRow,
        owner: &str,
        profile: &ProfileConfig,
    ) -> BayResult<SessionRow> {
        if Self::is_ready(&session) {
            return Ok(session);
        }
        if session.observed_state == SessionState::Starting.to_string() {
            return Err(BayError::session_not_ready(session.sandbox_id.clone(), 1000));
        }

        let result = self.promote(session, workspace, owner, profile).await;
        if let Err((id, err)) = &result {
            tracing::warn!(session_id = %id, error = %err, "session promotion failed");
            if let Err(mark_err) = self.db.set_states(id, "running", "failed").await {
                tracing::warn!(session_id = %id, error = %mark_err, "failed to persist failed state");
            }
        }
        result.map_err(|(_, err)| err)
    }

    async fn promote(
        &self,
        mut session: SessionRow,
        workspace: &WorkspaceRow,
        owner: &str,
        profile: &ProfileConfig,
    ) -> Result<SessionRow, (String, BayError)> {
        let id = session.id.clone();
        let mark = |e: BayError| (id.clone(), e);

        self.db.set_states(&id, "running", "starting").await.map_err(storage_err).map_err(mark)?;

        let container_id = match session.container_id.clone() {
            Some(container_id) => container_id,
            None => {
                let runtime_port = profile.runtime_port.unwrap_or(8123);
                let spec = CreateSpec {
                    session_id: &session.id,
                    sandbox_id: &session.sandbox_id,
                    owner,
                    workspace_id: &workspace.id,
                    workspace_driver_ref: &workspace.driver_ref,
                    profile_id: &profile.id,
                    image: &profile.image,
                    cpus: profile.resources.cpus,
                    memory: &profile.resources.memory,
                    runtime_port,
                    env: &HashMap::new(),
                };
                let container_id = self.driver.create(spec).await.map_err(driver_err).map_err(mark)?;
                self.db.set_container_id(&id, &container_id).await.map_err(storage_err).map_err(mark)?;
                session.container_id = Some(container_id.clone());
                container_id
            }
        };

        let runtime_port = profile.runtime_port.unwrap_or(8123);
        let endpoint = self.driver.start(&container_id, runtime_port).await.map_err(driver_err).map_err(mark)?;
        self.db.set_endpoint(&id, Some(&endpoint)).await.map_err(storage_err).map_err(mark)?;
        session.endpoint = Some(endpoint.clone());

        self.wait_for_ready(&endpoint, &session.sandbox_id).await.map_err(mark)?;

        self.db.set_states(&id, "running", "running").await.map_err(storage_err).map_err(mark)?;
        session.desired_state = SessionState::Running.to_string();
        session.observed_state = SessionState::Running.to_string();
        Ok(session)
    }

    /// Polls `GET <endpoint>/health` with exponential backoff until it
    /// returns 200, or `PROBE_MAX_WAIT` elapses.
    async fn wait_for_ready(&self, endpoint: &str, sandbox_id: &str) -> Result<(), BayError> {
        let url = format!("{}/health", endpoint.trim_end_matches('/'));
        let deadline = tokio::time::Instant::now() + PROBE_MAX_WAIT;
        let mut interval = PROBE_INITIAL_INTERVAL;

        loop {
            match self.http.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => {}
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BayError::session_not_ready(sandbox_id, 1000));
            }
            let sleep_for = interval.min(deadline.saturating_duration_since(tokio::time::Instant::now()));
            tokio::time::sleep(sleep_for).await;
            interval = interval
                .mul_f64(PROBE_BACKOFF_FACTOR)
                .min(PROBE_MAX_INTERVAL);
        }
    }

    pub async fn stop(&self, session: SessionRow) -> BayResult<SessionRow> {
        self.db.set_states(&session.id, "stopped", "stopping").await.map_err(storage_err)?;
        if let Some(container_id) = &session.container_id {
            self.driver.stop(container_id).await.map_err(driver_err)?;
        }
        self.db.set_states(&session.id, "stopped", "stopped").await.map_err(storage_err)?;
        self.db.set_endpoint(&session.id, None).await.map_err(storage_err)?;
        Ok(SessionRow { observed_state: SessionState::Stopped.to_string(), endpoint: None, ..session })
    }

    pub async fn destroy(&self, session: &SessionRow) -> BayResult<()> {
        if let Some(container_id) = &session.container_id {
            self.driver.destroy(container_id).await.map_err(driver_err)?;
        }
        self.db.delete_session(&session.id).await.map_err(storage_err)
    }

    /// Reconciles `observed_state` from the driver's view of the
    /// container, per the mapping table in §4.3.
    pub async fn refresh_status(
        &self,
        session: SessionRow,
        runtime_port: Option<u16>,
    ) -> BayResult<SessionRow> {
        let Some(container_id) = session.container_id.clone() else {
            return Ok(session);
        };
        let info = self.driver.status(&container_id, runtime_port).await.map_err(driver_err)?;

        match info.status {
            ContainerStatus::Running => {
                self.db.set_states(&session.id, "running", "running").await.map_err(storage_err)?;
                if let Some(endpoint) = &info.endpoint {
                    self.db.set_endpoint(&session.id, Some(endpoint)).await.map_err(storage_err)?;
                }
                Ok(SessionRow {
                    observed_state: SessionState::Running.to_string(),
                    endpoint: info.endpoint,
                    ..session
                })
            }
            ContainerStatus::Created => {
                self.db.set_states(&session.id, session.desired_state.as_str(), "pending").await.map_err(storage_err)?;
                Ok(SessionRow { observed_state: SessionState::Pending.to_string(), ..session })
            }
            ContainerStatus::Exited => {
                self.db.set_states(&session.id, session.desired_state.as_str(), "stopped").await.map_err(storage_err)?;
                Ok(SessionRow { observed_state: SessionState::Stopped.to_string(), ..session })
            }
            ContainerStatus::NotFound => {
                self.db.set_states(&session.id, session.desired_state.as_str(), "stopped").await.map_err(storage_err)?;
                self.db.clear_container_id(&session.id).await.map_err(storage_err)?;
                Ok(SessionRow {
                    observed_state: SessionState::Stopped.to_string(),
                    container_id: None,
                    ..session
                })
            }
            ContainerStatus::Removing => Ok(session),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
