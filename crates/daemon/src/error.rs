// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `BayError` → HTTP response, producing the `{error:{code,message,
//! details?}}` envelope from spec §7. The correlating request id travels
//! as the `x-request-id` response header (set by the request-id layer in
//! [`crate::server`]) rather than duplicated into the JSON body, since
//! `IntoResponse` has no handle on the inbound request to read it from.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use bay_core::BayError;
use bay_wire::{ErrorBody, ErrorEnvelope};

pub struct ApiError(pub BayError);

impl From<BayError> for ApiError {
    fn from(err: BayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = &self.0;
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = err.code(), error = %err, "request failed");
        } else {
            tracing::warn!(code = err.code(), error = %err, "request rejected");
        }

        let details = match err {
            BayError::CapabilityNotSupported { available, .. } => Some(json!({"available": available})),
            BayError::SessionNotReady { retry_after_ms, .. } => Some(json!({"retry_after_ms": retry_after_ms})),
            _ => None,
        };

        let body = ErrorEnvelope {
            error: ErrorBody { code: err.code(), message: err.to_string(), request_id: None, details },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
