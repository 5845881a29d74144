// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::Deserialize;

/// Body of `POST /v1/sandboxes`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSandboxRequest {
    pub profile: String,
    pub workspace_id: Option<String>,
    pub ttl: Option<u64>,
}

/// Body of `POST /v1/sandboxes/{id}/python/exec`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecPythonRequest {
    pub code: String,
    pub timeout: u64,
}

/// Body of `POST /v1/sandboxes/{id}/shell/exec`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecShellRequest {
    pub command: String,
    pub timeout: u64,
    pub cwd: Option<String>,
}

/// Body of `POST /v1/sandboxes/{id}/files/write`.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteFileRequest {
    pub path: String,
    pub content: String,
}
