// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across Bay's crates.
//!
//! Every variant carries a stable `code` and an HTTP status so the edge
//! layer can convert it to the `{error:{code,message,...}}` envelope without
//! re-deriving policy. Construction happens deep in managers/drivers/clients;
//! this type is what crosses crate boundaries.

use thiserror::Error;

/// Top-level error type for Bay's control plane.
#[derive(Debug, Error)]
pub enum BayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("runtime does not support capability {capability:?}")]
    CapabilityNotSupported { capability: String, available: Vec<String> },

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("quota exceeded")]
    QuotaExceeded,

    /// Session is mid-promotion. Retryable; callers should back off by
    /// `retry_after_ms`.
    #[error("session {sandbox_id} not ready yet")]
    SessionNotReady { sandbox_id: String, retry_after_ms: u64 },

    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Non-2xx response from the in-container runtime (Ship).
    #[error("runtime error: {0}")]
    RuntimeError(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BayError {
    /// Stable machine-readable error code, as it appears in the response
    /// envelope and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::CapabilityNotSupported { .. } => "capability_not_supported",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::FileNotFound { .. } => "file_not_found",
            Self::Conflict(_) => "conflict",
            Self::QuotaExceeded => "quota_exceeded",
            Self::SessionNotReady { .. } => "session_not_ready",
            Self::Timeout(_) => "timeout",
            Self::RuntimeError(_) => "ship_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status this error maps to at the edge.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::CapabilityNotSupported { .. } => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound { .. } => 404,
            Self::FileNotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::QuotaExceeded => 429,
            Self::SessionNotReady { .. } => 503,
            Self::Timeout(_) => 504,
            Self::RuntimeError(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn session_not_ready(sandbox_id: impl Into<String>, retry_after_ms: u64) -> Self {
        Self::SessionNotReady { sandbox_id: sandbox_id.into(), retry_after_ms }
    }
}

pub type BayResult<T> = Result<T, BayError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
