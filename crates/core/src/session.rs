// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifier and state machine.
//!
//! A session is the short-lived compute half of a sandbox: one container,
//! one lifecycle, tracked through `desired_state`/`observed_state` pairs so
//! reconciliation can tell "what we asked for" from "what the driver says
//! is true" apart.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a session.
    pub struct SessionId("sess-");
}

/// Lifecycle state of a session's backing container.
///
/// At most one session per sandbox may be in `Pending`, `Starting`, or
/// `Running` at any moment; `Endpoint` is only meaningful (non-null) while
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Pending,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

crate::simple_display! {
    SessionState {
        Pending => "pending",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        Failed => "failed",
    }
}

impl SessionState {
    /// Whether this state counts as "currently occupying" the sandbox's
    /// single live-session slot.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Starting | Self::Running)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
