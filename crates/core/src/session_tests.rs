// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn session_id_has_prefix() {
    let id = SessionId::new();
    assert!(id.as_str().starts_with("sess-"));
}

#[test]
fn is_live_matches_pending_starting_running_only() {
    assert!(SessionState::Pending.is_live());
    assert!(SessionState::Starting.is_live());
    assert!(SessionState::Running.is_live());
    assert!(!SessionState::Stopping.is_live());
    assert!(!SessionState::Stopped.is_live());
    assert!(!SessionState::Failed.is_live());
}

#[test]
fn state_display() {
    assert_eq!(SessionState::Running.to_string(), "running");
    assert_eq!(SessionState::Failed.to_string(), "failed");
}

#[test]
fn state_serde_uses_snake_case() {
    let json = serde_json::to_string(&SessionState::Stopping).unwrap();
    assert_eq!(json, "\"stopping\"");
}
