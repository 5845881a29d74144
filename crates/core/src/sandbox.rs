// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox identifier and derived status.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a sandbox: the owner-facing persistent handle
    /// to compute + workspace + profile.
    pub struct SandboxId("sandbox-");
}

/// Status of a sandbox, derived from its current session (never stored).
///
/// - `Idle`: no current session.
/// - `Starting`: current session is `pending` or `starting`.
/// - `Ready`: current session is `running`.
/// - `Stopped`: current session is `stopped` or `failed`.
/// - `Deleted`: `deleted_at` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxStatus {
    Idle,
    Starting,
    Ready,
    Stopped,
    Deleted,
}

crate::simple_display! {
    SandboxStatus {
        Idle => "idle",
        Starting => "starting",
        Ready => "ready",
        Stopped => "stopped",
        Deleted => "deleted",
    }
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
