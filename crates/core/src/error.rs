// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for folio-core operations.

use thiserror::Error;

/// All possible errors that can occur in folio-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(
        "invalid content type: '{0}'\n  hint: valid types are: checklist, guide, deck"
    )]
    InvalidContentType(String),

    #[error("invalid visibility: '{0}'\n  hint: valid values are: private, unlisted, public")]
    InvalidVisibility(String),

    #[error(
        "invalid sync status: '{0}'\n  hint: valid values are: pending, pending_update, synced"
    )]
    InvalidSyncStatus(String),

    #[error(
        "invalid queue operation: '{0}'\n  hint: valid operations are: publish, publish_update, unpublish"
    )]
    InvalidOperation(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
