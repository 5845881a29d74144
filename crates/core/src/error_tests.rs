// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn codes_match_spec_table() {
    assert_eq!(BayError::Validation("x".into()).code(), "validation_error");
    assert_eq!(
        BayError::CapabilityNotSupported { capability: "gpu".into(), available: vec![] }.code(),
        "capability_not_supported"
    );
    assert_eq!(BayError::Unauthorized.code(), "unauthorized");
    assert_eq!(BayError::Forbidden.code(), "forbidden");
    assert_eq!(BayError::not_found("sandbox").code(), "not_found");
    assert_eq!(BayError::FileNotFound { path: "/x".into() }.code(), "file_not_found");
    assert_eq!(BayError::Conflict("x".into()).code(), "conflict");
    assert_eq!(BayError::QuotaExceeded.code(), "quota_exceeded");
    assert_eq!(BayError::session_not_ready("sandbox-1", 1000).code(), "session_not_ready");
    assert_eq!(BayError::Timeout("x".into()).code(), "timeout");
    assert_eq!(BayError::RuntimeError("x".into()).code(), "ship_error");
    assert_eq!(BayError::Internal("x".into()).code(), "internal_error");
}

#[test]
fn status_codes_match_spec_table() {
    assert_eq!(BayError::Validation("x".into()).status_code(), 400);
    assert_eq!(BayError::Unauthorized.status_code(), 401);
    assert_eq!(BayError::Forbidden.status_code(), 403);
    assert_eq!(BayError::not_found("sandbox").status_code(), 404);
    assert_eq!(BayError::Conflict("x".into()).status_code(), 409);
    assert_eq!(BayError::QuotaExceeded.status_code(), 429);
    assert_eq!(BayError::session_not_ready("sandbox-1", 1000).status_code(), 503);
    assert_eq!(BayError::Timeout("x".into()).status_code(), 504);
    assert_eq!(BayError::RuntimeError("x".into()).status_code(), 502);
    assert_eq!(BayError::Internal("x".into()).status_code(), 500);
}
