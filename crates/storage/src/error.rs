// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer errors.

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("invalid timestamp in column {column}: {source}")]
    InvalidTimestamp { column: String, source: chrono::ParseError },

    #[error("invalid JSON in column {column}: {source}")]
    InvalidJson { column: String, source: serde_json::Error },

    #[error("row vanished after write: {what}")]
    MissingAfterWrite { what: String },
}

impl StorageError {
    /// True for a unique-constraint violation on either backend.
    ///
    /// SQLite reports `2067`/`1555`; Postgres reports `23505`.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => db_err
                .code()
                .map(|code| matches!(code.as_ref(), "2067" | "1555" | "23505"))
                .unwrap_or(false),
            _ => false,
        }
    }
}
