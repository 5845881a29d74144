// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory test doubles for `Driver` and `RuntimeClient`, used by
//! `bay-engine`'s test suite so it never needs a real Docker daemon or Ship
//! container to exercise session/sandbox orchestration.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::driver::{ContainerInfo, ContainerStatus, CreateSpec, Driver};
use crate::error::{DriverError, RuntimeError};
use crate::runtime::{DirEntry, ExecOutcome, RuntimeClient, RuntimeMeta};

#[derive(Debug, Clone)]
struct FakeContainer {
    status: ContainerStatus,
    endpoint: Option<String>,
}

/// Records every call made to it so tests can assert on driver interaction,
/// and lets tests force a container into a particular status (e.g. to
/// simulate a container that exited out from under a session).
#[derive(Default)]
pub struct FakeDriver {
    containers: Mutex<HashMap<String, FakeContainer>>,
    volumes: Mutex<HashMap<String, bool>>,
    calls: Mutex<Vec<String>>,
    next_id: Mutex<u64>,
    fail_create: Mutex<bool>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Force the given container into a status, simulating an out-of-band
    /// crash or removal observed on the next `status()` call.
    pub fn set_status(&self, container_id: &str, status: ContainerStatus) {
        if let Some(c) = self.containers.lock().get_mut(container_id) {
            c.status = status;
        }
    }

    pub fn fail_next_create(&self) {
        *self.fail_create.lock() = true;
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn create(&self, spec: CreateSpec<'_>) -> Result<String, DriverError> {
        self.record(format!("create:{}", spec.session_id));
        if std::mem::take(&mut *self.fail_create.lock()) {
            return Err(DriverError::Engine("simulated create failure".to_string()));
        }
        let mut next_id = self.next_id.lock();
        *next_id += 1;
        let id = format!("fake-container-{next_id}");
        self.containers
            .lock()
            .insert(id.clone(), FakeContainer { status: ContainerStatus::Created, endpoint: None });
        Ok(id)
    }

    async fn start(&self, container_id: &str, runtime_port: u16) -> Result<String, DriverError> {
        self.record(format!("start:{container_id}"));
        let mut containers = self.containers.lock();
        let container =
            containers.get_mut(container_id).ok_or_else(|| DriverError::NotFound(container_id.to_string()))?;
        let endpoint = format!("http://fake-runtime-{container_id}:{runtime_port}");
        container.status = ContainerStatus::Running;
        container.endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }

    async fn stop(&self, container_id: &str) -> Result<(), DriverError> {
        self.record(format!("stop:{container_id}"));
        if let Some(c) = self.containers.lock().get_mut(container_id) {
            c.status = ContainerStatus::Exited;
            c.endpoint = None;
        }
        Ok(())
    }

    async fn destroy(&self, container_id: &str) -> Result<(), DriverError> {
        self.record(format!("destroy:{container_id}"));
        self.containers.lock().remove(container_id);
        Ok(())
    }

    async fn status(
        &self,
        container_id: &str,
        _runtime_port: Option<u16>,
    ) -> Result<ContainerInfo, DriverError> {
        let containers = self.containers.lock();
        Ok(match containers.get(container_id) {
            Some(c) => ContainerInfo {
                container_id: container_id.to_string(),
                status: c.status,
                endpoint: c.endpoint.clone(),
                exit_code: None,
            },
            None => ContainerInfo {
                container_id: container_id.to_string(),
                status: ContainerStatus::NotFound,
                endpoint: None,
                exit_code: None,
            },
        })
    }

    async fn logs(&self, _container_id: &str, _tail: usize) -> Result<String, DriverError> {
        Ok(String::new())
    }

    async fn create_volume(
        &self,
        name: &str,
        _labels: HashMap<String, String>,
    ) -> Result<String, DriverError> {
        self.volumes.lock().insert(name.to_string(), true);
        Ok(name.to_string())
    }

    async fn delete_volume(&self, name: &str) -> Result<(), DriverError> {
        self.volumes.lock().remove(name);
        Ok(())
    }

    async fn volume_exists(&self, name: &str) -> Result<bool, DriverError> {
        Ok(self.volumes.lock().contains_key(name))
    }
}

/// In-memory `RuntimeClient` backed by a virtual filesystem, for exercising
/// the capability router and exec paths without a real Ship container.
pub struct FakeRuntimeClient {
    meta: RuntimeMeta,
    files: Mutex<HashMap<String, String>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    healthy: Mutex<bool>,
}

impl FakeRuntimeClient {
    pub fn new() -> Self {
        Self {
            meta: RuntimeMeta {
                name: "ship".to_string(),
                version: "fake".to_string(),
                api_version: "v1".to_string(),
                mount_path: "/workspace".to_string(),
                capabilities: HashMap::from([
                    ("filesystem".to_string(), true),
                    ("shell".to_string(), true),
                    ("python".to_string(), true),
                ]),
            },
            files: Mutex::new(HashMap::new()),
            blobs: Mutex::new(HashMap::new()),
            healthy: Mutex::new(true),
        }
    }

    pub fn with_capabilities(capabilities: HashMap<String, bool>) -> Self {
        let mut client = Self::new();
        client.meta.capabilities = capabilities;
        client
    }

    pub fn set_unhealthy(&self) {
        *self.healthy.lock() = false;
    }

    pub fn seed_file(&self, path: &str, content: &str) {
        self.files.lock().insert(path.to_string(), content.to_string());
    }
}

impl Default for FakeRuntimeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntimeClient {
    async fn get_meta(&self) -> Result<RuntimeMeta, RuntimeError> {
        Ok(self.meta.clone())
    }

    async fn health(&self) -> Result<(), RuntimeError> {
        if *self.healthy.lock() {
            Ok(())
        } else {
            Err(RuntimeError::Transport("fake runtime marked unhealthy".to_string()))
        }
    }

    async fn read_file(&self, path: &str) -> Result<String, RuntimeError> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::Response { status: 404, body: format!("{path} not found") })
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), RuntimeError> {
        self.files.lock().insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn list_files(&self, path: &str) -> Result<Vec<DirEntry>, RuntimeError> {
        let prefix = if path.ends_with('/') { path.to_string() } else { format!("{path}/") };
        Ok(self
            .files
            .lock()
            .iter()
            .filter(|(p, _)| p.starts_with(&prefix))
            .map(|(p, content)| DirEntry {
                name: p.rsplit('/').next().unwrap_or(p).to_string(),
                path: p.clone(),
                is_dir: false,
                size: content.len() as u64,
            })
            .collect())
    }

    async fn delete_file(&self, path: &str) -> Result<(), RuntimeError> {
        self.files.lock().remove(path);
        Ok(())
    }

    async fn upload_file(&self, path: &str, bytes: Vec<u8>) -> Result<u64, RuntimeError> {
        let size = bytes.len() as u64;
        self.blobs.lock().insert(path.to_string(), bytes);
        Ok(size)
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, RuntimeError> {
        self.blobs
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::Response { status: 404, body: format!("{path} not found") })
    }

    async fn exec_shell(
        &self,
        command: &str,
        _timeout_secs: u64,
        _cwd: Option<&str>,
    ) -> Result<ExecOutcome, RuntimeError> {
        Ok(ExecOutcome {
            success: true,
            output: format!("ran: {command}"),
            error: None,
            exit_code: Some(0),
        })
    }

    async fn exec_python(&self, code: &str, _timeout_secs: u64) -> Result<ExecOutcome, RuntimeError> {
        Ok(ExecOutcome { success: true, output: format!("ran: {code}"), error: None, exit_code: None })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

/// Shared helper for other crates' tests that need a `Driver` trait object.
pub fn arc_fake_driver() -> Arc<dyn Driver> {
    Arc::new(FakeDriver::new())
}

/// Shared helper for other crates' tests that need a `RuntimeClient` trait object.
pub fn arc_fake_runtime() -> Arc<dyn RuntimeClient> {
    Arc::new(FakeRuntimeClient::new())
}
