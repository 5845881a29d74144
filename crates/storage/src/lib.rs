// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bay-storage: relational persistence for sandboxes, sessions, workspaces,
//! and idempotency keys.
//!
//! Phase 1 targets SQLite; Postgres is a drop-in swap for multi-instance
//! deployments. The two diverge only where SQLite lacks a feature Postgres
//! has (row locks via `SELECT ... FOR UPDATE`) — callers branch on
//! [`Database::dialect`] at exactly those points, nowhere else.

pub mod error;
pub mod idempotency;
pub mod models;
pub mod sandboxes;
pub mod sessions;
pub mod workspaces;

use std::sync::Once;

use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::AnyPool;

pub use error::StorageError;
pub use models::{IdempotencyKeyRow, SandboxRow, SessionRow, WorkspaceRow};

/// Which relational backend a [`Database`] is talking to.
///
/// SQLite has no real row-level locking, so the sandbox critical section
/// (`SandboxManager::ensure_running`, spec §4.4) relies on an in-process
/// per-sandbox mutex there; Postgres additionally takes `SELECT ... FOR
/// UPDATE` to serialize across multiple Bay instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

/// Handle to the configured database pool.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    dialect: Dialect,
}

impl Database {
    /// Connects (creating the SQLite file if needed) and runs pending
    /// migrations. `database_url` selects the dialect by scheme:
    /// `sqlite://...` or `postgres://...` / `postgresql://...`.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        static INSTALL_DRIVERS: Once = Once::new();
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let dialect = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
        {
            Dialect::Postgres
        } else {
            Dialect::Sqlite
        };

        let max_connections = match dialect {
            Dialect::Sqlite if database_url.contains(":memory:") => 1,
            Dialect::Sqlite => 8,
            Dialect::Postgres => 16,
        };

        let pool = AnyPoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        match dialect {
            Dialect::Sqlite => sqlx::migrate!("./migrations").run(&pool).await?,
            Dialect::Postgres => sqlx::migrate!("./migrations_postgres").run(&pool).await?,
        }

        Ok(Self { pool, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

pub(crate) fn decode_datetime(
    row: &AnyRow,
    column: &str,
) -> Result<chrono::DateTime<chrono::Utc>, StorageError> {
    use sqlx::Row;
    let raw: String = row.try_get(column)?;
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|source| StorageError::InvalidTimestamp { column: column.to_string(), source })
}

pub(crate) fn decode_optional_datetime(
    row: &AnyRow,
    column: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, StorageError> {
    use sqlx::Row;
    match row.try_get::<Option<String>, _>(column)? {
        Some(raw) => chrono::DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&chrono::Utc)))
            .map_err(|source| StorageError::InvalidTimestamp { column: column.to_string(), source }),
        None => Ok(None),
    }
}

pub(crate) fn encode_datetime(value: chrono::DateTime<chrono::Utc>) -> String {
    value.to_rfc3339()
}

pub(crate) fn encode_optional_datetime(value: Option<chrono::DateTime<chrono::Utc>>) -> Option<String> {
    value.map(encode_datetime)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
