// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves a sandbox to a live runtime endpoint, validates the requested
//! capability against the runtime's advertised `/meta`, and dispatches.
//! Adapters are cached by endpoint so repeated calls to the same session
//! reuse one HTTP client and one cached handshake.

use std::collections::HashMap;
use std::sync::Arc;

use bay_adapters::{DirEntry, ExecOutcome, RuntimeClient, ShipClient};
use bay_core::{BayError, BayResult, OwnerId, SandboxId};
use parking_lot::Mutex;

use crate::convert::runtime_err;
use crate::sandbox::SandboxManager;

/// The capability a dispatched operation belongs to, as advertised in
/// runtime `/meta.capabilities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityOp {
    Python,
    Shell,
    Filesystem,
}

impl CapabilityOp {
    fn meta_key(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Shell => "shell",
            Self::Filesystem => "filesystem",
        }
    }
}

pub struct CapabilityRouter {
    sandboxes: Arc<SandboxManager>,
    adapters: Mutex<HashMap<String, Arc<dyn RuntimeClient>>>,
}

impl CapabilityRouter {
    pub fn new(sandboxes: Arc<SandboxManager>) -> Self {
        Self { sandboxes, adapters: Mutex::new(HashMap::new()) }
    }

    /// Brings the sandbox's session up if needed and returns the adapter
    /// for it, after confirming the runtime advertises `op`.
    async fn route(
        &self,
        owner: &OwnerId,
        sandbox_id: &SandboxId,
        op: CapabilityOp,
    ) -> BayResult<Arc<dyn RuntimeClient>> {
        let session = self.sandboxes.ensure_running(owner, sandbox_id).await?;
        let endpoint = session
            .endpoint
            .ok_or_else(|| BayError::session_not_ready(sandbox_id.as_str(), 1000))?;

        let adapter = self.adapter_for(&endpoint, &session.runtime_type)?;

        let meta = adapter.get_meta().await.map_err(runtime_err)?;
        if !meta.supports(op.meta_key()) {
            let available = meta.capabilities.iter().filter(|(_, &ok)| ok).map(|(name, _)| name.clone()).collect();
            return Err(BayError::CapabilityNotSupported { capability: op.meta_key().to_string(), available });
        }
        Ok(adapter)
    }

    fn adapter_for(&self, endpoint: &str, runtime_type: &str) -> BayResult<Arc<dyn RuntimeClient>> {
        if runtime_type != "ship" {
            return Err(BayError::Internal(format!("unknown runtime type {runtime_type}")));
        }
        let mut adapters = self.adapters.lock();
        if let Some(adapter) = adapters.get(endpoint) {
            return Ok(adapter.clone());
        }
        let adapter: Arc<dyn RuntimeClient> = Arc::new(ShipClient::new(endpoint.to_string()));
        adapters.insert(endpoint.to_string(), adapter.clone());
        Ok(adapter)
    }

    pub async fn exec_python(
        &self,
        owner: &OwnerId,
        sandbox_id: &SandboxId,
        code: &str,
        timeout_secs: u64,
    ) -> BayResult<ExecOutcome> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Python).await?;
        adapter.exec_python(code, timeout_secs).await.map_err(runtime_err)
    }

    pub async fn exec_shell(
        &self,
        owner: &OwnerId,
        sandbox_id: &SandboxId,
        command: &str,
        timeout_secs: u64,
        cwd: Option<&str>,
    ) -> BayResult<ExecOutcome> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Shell).await?;
        adapter.exec_shell(command, timeout_secs, cwd).await.map_err(runtime_err)
    }

    pub async fn read_file(&self, owner: &OwnerId, sandbox_id: &SandboxId, path: &str) -> BayResult<String> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Filesystem).await?;
        adapter.read_file(path).await.map_err(runtime_err)
    }

    pub async fn write_file(
        &self,
        owner: &OwnerId,
        sandbox_id: &SandboxId,
        path: &str,
        content: &str,
    ) -> BayResult<()> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Filesystem).await?;
        adapter.write_file(path, content).await.map_err(runtime_err)
    }

    pub async fn list_files(
        &self,
        owner: &OwnerId,
        sandbox_id: &SandboxId,
        path: &str,
    ) -> BayResult<Vec<DirEntry>> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Filesystem).await?;
        adapter.list_files(path).await.map_err(runtime_err)
    }

    pub async fn delete_file(&self, owner: &OwnerId, sandbox_id: &SandboxId, path: &str) -> BayResult<()> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Filesystem).await?;
        adapter.delete_file(path).await.map_err(runtime_err)
    }

    pub async fn upload_file(
        &self,
        owner: &OwnerId,
        sandbox_id: &SandboxId,
        path: &str,
        bytes: Vec<u8>,
    ) -> BayResult<u64> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Filesystem).await?;
        adapter.upload_file(path, bytes).await.map_err(runtime_err)
    }

    pub async fn download_file(&self, owner: &OwnerId, sandbox_id: &SandboxId, path: &str) -> BayResult<Vec<u8>> {
        let adapter = self.route(owner, sandbox_id, CapabilityOp::Filesystem).await?;
        adapter.download_file(path).await.map_err(runtime_err)
    }
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
