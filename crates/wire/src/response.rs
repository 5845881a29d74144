// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::Serialize;

use bay_core::SandboxStatus;

/// `SandboxRepr` (spec §6.1): `{id, status, profile, workspace_id,
/// capabilities[], created_at, expires_at?, idle_expires_at?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SandboxRepr {
    pub id: String,
    pub status: SandboxStatus,
    pub profile: String,
    pub workspace_id: String,
    pub capabilities: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SandboxListResponse {
    pub items: Vec<SandboxRepr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Response of `keepalive` and `stop`: `{status: "ok"|"stopped"}`.
#[derive(Debug, Clone, Serialize)]
pub struct OkStatusResponse {
    pub status: &'static str,
}

impl OkStatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }

    pub fn stopped() -> Self {
        Self { status: "stopped" }
    }
}

/// `ExecResult` (spec §6.1): the shape shared by `python/exec` and
/// `shell/exec`, flattening `Ship`'s distinct response envelopes into one.
#[derive(Debug, Clone, Serialize)]
pub struct ExecResultRepr {
    pub success: bool,
    pub output: ExecOutputRepr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecOutputRepr {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadFileResponse {
    pub content: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileEntryRepr {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<FileEntryRepr>,
    pub current_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub path: String,
    pub size: u64,
}

/// `{error: {code, message, request_id?, details?}}` (spec §7).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
