// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the narrow, boundary-local errors of `bay-storage` and
//! `bay-adapters` onto `BayError`'s response-envelope taxonomy. Neither
//! boundary crate knows about HTTP status codes or error codes; this is
//! the one place that translation happens.

use bay_adapters::{DriverError, RuntimeError};
use bay_core::BayError;
use bay_storage::StorageError;

pub(crate) fn storage_err(err: StorageError) -> BayError {
    BayError::Internal(err.to_string())
}

pub(crate) fn driver_err(err: DriverError) -> BayError {
    match err {
        DriverError::NotFound(id) => BayError::NotFound { resource: format!("container {id}") },
        DriverError::NoEndpoint(id) => {
            BayError::Internal(format!("container {id} has no resolvable endpoint"))
        }
        DriverError::Engine(msg) => BayError::Internal(msg),
    }
}

pub(crate) fn runtime_err(err: RuntimeError) -> BayError {
    match err {
        RuntimeError::Timeout => BayError::Timeout("runtime call timed out".to_string()),
        RuntimeError::Response { status, body } if status == 404 => {
            BayError::FileNotFound { path: body }
        }
        RuntimeError::Response { status, body } => {
            BayError::RuntimeError(format!("runtime responded {status}: {body}"))
        }
        RuntimeError::Transport(msg) => BayError::RuntimeError(msg),
        RuntimeError::Decode(msg) => BayError::RuntimeError(format!("malformed runtime response: {msg}")),
    }
}
