// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use bay_core::{BayError, SandboxId, SandboxStatus};
use bay_storage::SandboxRow;
use bay_wire::{CreateSandboxRequest, OkStatusResponse, SandboxListResponse, SandboxRepr};

use crate::auth::ExtractOwner;
use crate::error::ApiError;
use crate::state::AppState;

const CREATE_PATH: &str = "/v1/sandboxes";

async fn to_repr(state: &AppState, row: SandboxRow) -> Result<SandboxRepr, ApiError> {
    let session = state.sandboxes.get_current_session(&row).await?;
    let status = bay_engine::SandboxManager::status_of(&row, session.as_ref());
    let profile = state.settings.get_profile(&row.profile_id).ok_or_else(|| {
        BayError::Internal(format!("sandbox references unknown profile {}", row.profile_id))
    })?;
    Ok(SandboxRepr {
        id: row.id,
        status,
        profile: row.profile_id,
        workspace_id: row.workspace_id,
        capabilities: profile.capabilities.clone(),
        created_at: row.created_at,
        expires_at: row.expires_at,
        idle_expires_at: row.idle_expires_at,
    })
}

pub async fn create_sandbox(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let idempotency_key = headers.get("idempotency-key").and_then(|v| v.to_str().ok()).map(str::to_string);
    let body_str = String::from_utf8_lossy(&body).into_owned();

    if let Some(key) = &idempotency_key {
        if let Some(cached) = state.idempotency.check(owner.as_str(), key, CREATE_PATH, "POST", &body_str).await? {
            let status = StatusCode::from_u16(cached.status_code as u16).unwrap_or(StatusCode::CREATED);
            return Ok((status, [("content-type", "application/json")], cached.response_snapshot).into_response());
        }
    }

    let payload: CreateSandboxRequest =
        serde_json::from_slice(&body).map_err(|e| BayError::Validation(format!("invalid request body: {e}")))?;

    let row = state
        .sandboxes
        .create(&owner, &payload.profile, payload.workspace_id.as_deref(), payload.ttl)
        .await?;
    let repr = to_repr(&state, row).await?;
    let snapshot = serde_json::to_string(&repr).map_err(|e| BayError::Internal(e.to_string()))?;

    if let Some(key) = &idempotency_key {
        state
            .idempotency
            .save(owner.as_str(), key, CREATE_PATH, "POST", &body_str, &snapshot, StatusCode::CREATED.as_u16() as i32)
            .await?;
    }

    Ok((StatusCode::CREATED, [("content-type", "application/json")], snapshot).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    pub status: Option<SandboxStatus>,
}

pub async fn list_sandboxes(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Query(query): Query<ListQuery>,
) -> Result<Json<SandboxListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let (rows, next_cursor) = state.sandboxes.list(&owner, query.cursor.as_deref(), limit, query.status).await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(to_repr(&state, row).await?);
    }
    Ok(Json(SandboxListResponse { items, next_cursor }))
}

pub async fn get_sandbox(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
) -> Result<Json<SandboxRepr>, ApiError> {
    let row = state.sandboxes.get(&SandboxId::from_string(&id), &owner).await?;
    Ok(Json(to_repr(&state, row).await?))
}

pub async fn keepalive_sandbox(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
) -> Result<Json<OkStatusResponse>, ApiError> {
    state.sandboxes.keepalive(&owner, &SandboxId::from_string(&id)).await?;
    Ok(Json(OkStatusResponse::ok()))
}

pub async fn stop_sandbox(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
) -> Result<Json<OkStatusResponse>, ApiError> {
    state.sandboxes.stop(&owner, &SandboxId::from_string(&id)).await?;
    Ok(Json(OkStatusResponse::stopped()))
}

pub async fn delete_sandbox(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sandboxes.delete(&owner, &SandboxId::from_string(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "sandboxes_tests.rs"]
mod tests;
