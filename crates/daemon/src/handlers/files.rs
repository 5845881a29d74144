// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use bay_core::{BayError, SandboxId};
use bay_wire::{FileEntryRepr, ListFilesResponse, OkStatusResponse, ReadFileResponse, UploadResponse, WriteFileRequest};

use crate::auth::ExtractOwner;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: String,
}

pub async fn read_file(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ReadFileResponse>, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    let content = state.router.read_file(&owner, &sandbox_id, &query.path).await?;
    Ok(Json(ReadFileResponse { content, path: query.path }))
}

pub async fn write_file(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    Json(payload): Json<WriteFileRequest>,
) -> Result<Json<OkStatusResponse>, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    state.router.write_file(&owner, &sandbox_id, &payload.path, &payload.content).await?;
    Ok(Json(OkStatusResponse::ok()))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ListFilesResponse>, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    let entries = state.router.list_files(&owner, &sandbox_id, &query.path).await?;
    Ok(Json(ListFilesResponse {
        files: entries
            .into_iter()
            .map(|e| FileEntryRepr { name: e.name, path: e.path, is_dir: e.is_dir, size: e.size })
            .collect(),
        current_path: query.path,
    }))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<Json<OkStatusResponse>, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    state.router.delete_file(&owner, &sandbox_id, &query.path).await?;
    Ok(Json(OkStatusResponse::ok()))
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    let mut path = None;
    let mut bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| BayError::Validation(e.to_string()))? {
        match field.name() {
            Some("path") => {
                path = Some(field.text().await.map_err(|e| BayError::Validation(e.to_string()))?);
            }
            Some("file") => {
                bytes = Some(field.bytes().await.map_err(|e| BayError::Validation(e.to_string()))?.to_vec());
            }
            _ => {}
        }
    }

    let path = path.ok_or_else(|| BayError::Validation("multipart upload missing 'path' field".into()))?;
    let bytes = bytes.ok_or_else(|| BayError::Validation("multipart upload missing 'file' field".into()))?;

    let size = state.router.upload_file(&owner, &sandbox_id, &path, bytes).await?;
    Ok(Json(UploadResponse { status: "ok", path, size }))
}

pub async fn download_file(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    let content = state.router.download_file(&owner, &sandbox_id, &query.path).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Bytes::from(content),
    )
        .into_response())
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
