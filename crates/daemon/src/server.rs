// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Axum wiring for the HTTP edge: router layout (spec §6.1, nested under
//! `/v1`) plus the tracing and request-id middleware around it.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use bay_core::Settings;

use crate::handlers::{exec, files, sandboxes};
use crate::state::AppState;

pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let state = Arc::new(AppState::build(settings).await?);
    let app = build_router(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "bay-daemon listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/sandboxes", post(sandboxes::create_sandbox).get(sandboxes::list_sandboxes))
        .route("/v1/sandboxes/:id", get(sandboxes::get_sandbox).delete(sandboxes::delete_sandbox))
        .route("/v1/sandboxes/:id/keepalive", post(sandboxes::keepalive_sandbox))
        .route("/v1/sandboxes/:id/stop", post(sandboxes::stop_sandbox))
        .route("/v1/sandboxes/:id/python/exec", post(exec::exec_python))
        .route("/v1/sandboxes/:id/shell/exec", post(exec::exec_shell))
        .route("/v1/sandboxes/:id/files/read", get(files::read_file))
        .route("/v1/sandboxes/:id/files/write", post(files::write_file))
        .route("/v1/sandboxes/:id/files/list", get(files::list_files))
        .route("/v1/sandboxes/:id/files/delete", delete(files::delete_file))
        .route("/v1/sandboxes/:id/files/upload", post(files::upload_file))
        .route("/v1/sandboxes/:id/files/download", get(files::download_file))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
