// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Abstract HTTP surface of an in-container runtime (Ship today; other
//! runtime images could implement the same contract in the future).
//!
//! A `RuntimeClient` is a pure transport: it has no retry policy and no
//! knowledge of sandbox/session bookkeeping. The `/meta` handshake is used
//! by `bay-engine`'s capability router to validate that a session actually
//! supports the capability being invoked before routing a request to it.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::RuntimeError;

/// Runtime self-description, returned from `GET /meta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeMeta {
    pub name: String,
    pub version: String,
    pub api_version: String,
    pub mount_path: String,
    /// capability name -> supported (e.g. `"python" -> true`).
    pub capabilities: HashMap<String, bool>,
}

impl RuntimeMeta {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.get(capability).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub exit_code: Option<i32>,
}

#[async_trait]
pub trait RuntimeClient: Send + Sync + 'static {
    async fn get_meta(&self) -> Result<RuntimeMeta, RuntimeError>;
    async fn health(&self) -> Result<(), RuntimeError>;

    async fn read_file(&self, path: &str) -> Result<String, RuntimeError>;
    async fn write_file(&self, path: &str, content: &str) -> Result<(), RuntimeError>;
    async fn list_files(&self, path: &str) -> Result<Vec<DirEntry>, RuntimeError>;
    async fn delete_file(&self, path: &str) -> Result<(), RuntimeError>;

    /// Returns the size written, as reported by the runtime.
    async fn upload_file(&self, path: &str, bytes: Vec<u8>) -> Result<u64, RuntimeError>;
    async fn download_file(&self, path: &str) -> Result<Vec<u8>, RuntimeError>;

    async fn exec_shell(
        &self,
        command: &str,
        timeout_secs: u64,
        cwd: Option<&str>,
    ) -> Result<ExecOutcome, RuntimeError>;

    async fn exec_python(&self, code: &str, timeout_secs: u64) -> Result<ExecOutcome, RuntimeError>;
}
