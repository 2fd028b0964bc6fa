// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! folio-sync: Local-first sync engine for the folio content library
//!
//! This crate provides:
//! - An async handle over the persistent store
//! - The durable sync queue and its drain loop
//! - Visibility transitions (publish, update, unpublish, fork)
//! - The in-memory library with a memoized content cache
//! - A background trigger/backoff scheduler
//!
//! The backend and the auth provider are injected through the [`RemoteApi`]
//! and [`AuthProvider`] traits.

pub mod auth;
pub mod config;
pub mod error;
pub mod id;
pub mod library;
pub mod payload;
pub mod remote;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod visibility;

#[cfg(test)]
mod test_helpers;

pub use auth::{AuthProvider, CurrentUser};
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use id::{derive_public_id, new_content_id};
pub use library::{remote_content_type, LibraryStore};
pub use payload::{ContentPublishPayload, UnpublishPayload};
pub use remote::{
    PublishResponse, RemoteApi, RemoteError, RemoteFuture, RemoteResult, SharedContentDetail,
    UpdateResponse,
};
pub use scheduler::SyncScheduler;
pub use service::{ContentSyncService, SyncSummary};
pub use storage::Storage;
pub use visibility::{validate_for_publish, VisibilityService, MIN_TITLE_LEN};
