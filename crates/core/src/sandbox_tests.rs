// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn sandbox_id_has_prefix() {
    let id = SandboxId::new();
    assert!(id.as_str().starts_with("sandbox-"));
}

#[test]
fn sandbox_id_suffix_strips_prefix() {
    let id = SandboxId::from_string("sandbox-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn status_display() {
    assert_eq!(SandboxStatus::Idle.to_string(), "idle");
    assert_eq!(SandboxStatus::Starting.to_string(), "starting");
    assert_eq!(SandboxStatus::Ready.to_string(), "ready");
    assert_eq!(SandboxStatus::Stopped.to_string(), "stopped");
    assert_eq!(SandboxStatus::Deleted.to_string(), "deleted");
}

#[test]
fn status_serde_uses_snake_case() {
    let json = serde_json::to_string(&SandboxStatus::Ready).unwrap();
    assert_eq!(json, "\"ready\"");
}
