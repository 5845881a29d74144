// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use bay_core::SandboxId;
use bay_wire::{ExecOutputRepr, ExecPythonRequest, ExecResultRepr, ExecShellRequest};

use crate::auth::ExtractOwner;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn exec_python(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    Json(payload): Json<ExecPythonRequest>,
) -> Result<Json<ExecResultRepr>, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    let outcome = state.router.exec_python(&owner, &sandbox_id, &payload.code, payload.timeout).await?;
    Ok(Json(ExecResultRepr {
        success: outcome.success,
        output: ExecOutputRepr { text: outcome.output },
        exit_code: outcome.exit_code,
        error: outcome.error,
    }))
}

pub async fn exec_shell(
    State(state): State<Arc<AppState>>,
    ExtractOwner(owner): ExtractOwner,
    Path(id): Path<String>,
    Json(payload): Json<ExecShellRequest>,
) -> Result<Json<ExecResultRepr>, ApiError> {
    let sandbox_id = SandboxId::from_string(&id);
    let outcome = state
        .router
        .exec_shell(&owner, &sandbox_id, &payload.command, payload.timeout, payload.cwd.as_deref())
        .await?;
    Ok(Json(ExecResultRepr {
        success: outcome.success,
        output: ExecOutputRepr { text: outcome.output },
        exit_code: outcome.exit_code,
        error: outcome.error,
    }))
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
