// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bay_core::SandboxStatus;
use chrono::Utc;

#[test]
fn sandbox_repr_omits_absent_optional_fields() {
    let repr = SandboxRepr {
        id: "sandbox-1".into(),
        status: SandboxStatus::Idle,
        profile: "python-default".into(),
        workspace_id: "workspace-1".into(),
        capabilities: vec!["python".into(), "shell".into()],
        created_at: Utc::now(),
        expires_at: None,
        idle_expires_at: None,
    };
    let value = serde_json::to_value(&repr).unwrap();
    assert!(value.get("expires_at").is_none());
    assert!(value.get("idle_expires_at").is_none());
    assert_eq!(value["status"], "idle");
}

#[test]
fn error_envelope_matches_spec_shape() {
    let envelope = ErrorEnvelope {
        error: ErrorBody {
            code: "capability_not_supported",
            message: "runtime does not support capability \"shell\"".into(),
            request_id: Some("req-1".into()),
            details: Some(serde_json::json!({"available": ["python"]})),
        },
    };
    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["error"]["code"], "capability_not_supported");
    assert_eq!(value["error"]["details"]["available"][0], "python");
}

#[test]
fn ok_status_response_distinguishes_ok_and_stopped() {
    assert_eq!(serde_json::to_value(OkStatusResponse::ok()).unwrap()["status"], "ok");
    assert_eq!(serde_json::to_value(OkStatusResponse::stopped()).unwrap()["status"], "stopped");
}
