// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner extraction for the HTTP edge.
//!
//! There is no real authentication layer yet (spec §1 scopes JWT
//! verification out). `X-Owner` lets development clients pick an owner
//! directly; a `Bearer` token is accepted but only checked for presence,
//! not validated, matching
//! `original_source/pkgs/bay/app/api/dependencies.py::get_current_owner`.
//! Absent both, requests run as `OwnerId::default()`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header;
use std::convert::Infallible;

use bay_core::OwnerId;

pub struct ExtractOwner(pub OwnerId);

impl<S> FromRequestParts<S> for ExtractOwner
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(owner) = parts.headers.get("x-owner").and_then(|v| v.to_str().ok()) {
            if !owner.is_empty() {
                return Ok(ExtractOwner(OwnerId::new(owner)));
            }
        }

        // Bearer presence is enough to mark the caller authenticated; it
        // does not by itself name an owner, so `X-Owner` still wins above
        // and the default still applies below when neither is given.
        let _bearer_present = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("Bearer "));

        Ok(ExtractOwner(OwnerId::default()))
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
