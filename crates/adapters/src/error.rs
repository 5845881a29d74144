// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds for the two adapter boundaries. Callers (`bay-engine`) map
//! these onto `bay_core::BayError`; adapters themselves don't know about
//! the control plane's response envelope.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("docker engine error: {0}")]
    Engine(String),

    #[error("container {0} has no usable network endpoint")]
    NoEndpoint(String),
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("request to runtime timed out")]
    Timeout,

    #[error("runtime returned an error response: {status} {body}")]
    Response { status: u16, body: String },

    #[error("transport error talking to runtime: {0}")]
    Transport(String),

    #[error("runtime response could not be decoded: {0}")]
    Decode(String),
}
