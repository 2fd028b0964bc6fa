// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::remote::RemoteError;

/// All possible errors surfaced by the sync engine.
///
/// Delivery failures during a drain are not errors: they are recorded on the
/// queue row and reported through [`crate::SyncSummary`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("not authenticated\n  hint: sign in before publishing or unpublishing content")]
    NotAuthenticated,

    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("content not found: {0}")]
    NotFound(String),

    #[error("unsupported content type: '{0}'\n  hint: supported types are: checklist, guide, deck")]
    UnsupportedContentType(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("storage error: {0}")]
    Store(folio_core::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<folio_core::Error> for Error {
    fn from(err: folio_core::Error) -> Self {
        match err {
            folio_core::Error::NotFound(id) => Error::NotFound(id),
            folio_core::Error::ConstraintViolation(msg) => Error::ConstraintViolation(msg),
            other => Error::Store(other),
        }
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Network(msg) => Error::Network(msg),
            RemoteError::Server { status, message } => Error::Server { status, message },
            RemoteError::Decode(msg) => Error::Server {
                status: 0,
                message: format!("malformed response: {msg}"),
            },
        }
    }
}

/// A specialized Result type for sync engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
