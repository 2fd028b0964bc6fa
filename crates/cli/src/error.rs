// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the folio CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("content not found: {0}\n  hint: run 'folio list' to see library IDs")]
    NotFound(String),

    #[error("ambiguous content ID '{prefix}' matches: {}", matches.join(", "))]
    AmbiguousId {
        prefix: String,
        matches: Vec<String>,
    },

    #[error("{0}")]
    Store(folio_core::Error),

    #[error("{0}")]
    Sync(folio_sync::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<folio_core::Error> for Error {
    fn from(err: folio_core::Error) -> Self {
        match err {
            folio_core::Error::NotFound(id) => Error::NotFound(id),
            other => Error::Store(other),
        }
    }
}

impl From<folio_sync::Error> for Error {
    fn from(err: folio_sync::Error) -> Self {
        match err {
            folio_sync::Error::NotFound(id) => Error::NotFound(id),
            folio_sync::Error::Store(inner) => Error::from(inner),
            other => Error::Sync(other),
        }
    }
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
