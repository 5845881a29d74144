// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Abstract driver interface for container lifecycle management.
//!
//! A `Driver` is responsible only for container and volume lifecycle. It
//! does not handle authentication, retry/circuit-breaking, audit logging,
//! rate limiting, or quota management — those concerns live in the engine
//! layer, above the driver.
//!
//! All resources a driver creates must be labeled with owner, sandbox_id,
//! session_id, workspace_id, and profile_id so an operator can reconcile
//! orphans by hand.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::DriverError;

/// Container status from the driver's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    Running,
    Exited,
    Removing,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub container_id: String,
    pub status: ContainerStatus,
    /// Runtime HTTP endpoint, populated only when `status == Running` and a
    /// `runtime_port` was given.
    pub endpoint: Option<String>,
    pub exit_code: Option<i64>,
}

/// Everything a driver needs to create a runtime container. Gathered by the
/// caller so the driver never has to query storage itself.
#[derive(Debug, Clone)]
pub struct CreateSpec<'a> {
    pub session_id: &'a str,
    pub sandbox_id: &'a str,
    pub owner: &'a str,
    pub workspace_id: &'a str,
    /// Driver-specific reference to the workspace's storage (e.g. a Docker
    /// volume name, or a host path for bind mounts).
    pub workspace_driver_ref: &'a str,
    pub profile_id: &'a str,
    pub image: &'a str,
    pub cpus: f64,
    /// Human memory amount, e.g. `"1g"`.
    pub memory: &'a str,
    pub runtime_port: u16,
    pub env: &'a HashMap<String, String>,
}

#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Create a container without starting it. Returns the driver's
    /// container id.
    async fn create(&self, spec: CreateSpec<'_>) -> Result<String, DriverError>;

    /// Start a previously-created container and resolve its runtime
    /// endpoint.
    async fn start(&self, container_id: &str, runtime_port: u16) -> Result<String, DriverError>;

    /// Stop a running container. A no-op if it no longer exists.
    async fn stop(&self, container_id: &str) -> Result<(), DriverError>;

    /// Remove a container outright. A no-op if it no longer exists.
    async fn destroy(&self, container_id: &str) -> Result<(), DriverError>;

    /// Inspect a container. `runtime_port`, if given, lets the driver
    /// re-resolve `endpoint` for an already-running container.
    async fn status(
        &self,
        container_id: &str,
        runtime_port: Option<u16>,
    ) -> Result<ContainerInfo, DriverError>;

    async fn logs(&self, container_id: &str, tail: usize) -> Result<String, DriverError>;

    async fn create_volume(
        &self,
        name: &str,
        labels: HashMap<String, String>,
    ) -> Result<String, DriverError>;

    async fn delete_volume(&self, name: &str) -> Result<(), DriverError>;

    async fn volume_exists(&self, name: &str) -> Result<bool, DriverError>;
}
