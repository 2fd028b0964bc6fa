// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote API abstraction for the shared content backend.
//!
//! The sync engine only consumes this trait. Production clients and test
//! mocks both implement it.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::ContentPublishPayload;

/// Error type for remote calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The backend could not be reached.
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered with an error status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The backend answered with a body that could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by remote calls.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// Backend response to a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "public_id")]
    pub public_id: String,
    #[serde(rename = "published_at")]
    pub published_at: DateTime<Utc>,
    #[serde(rename = "author_username", default, skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(rename = "can_fork")]
    pub can_fork: bool,
}

/// Backend response to a successful content update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "public_id")]
    pub public_id: String,
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// A published item as returned by the backend, used as a fork source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedContentDetail {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "public_id")]
    pub public_id: String,
    #[serde(rename = "title")]
    pub title: String,
    #[serde(rename = "description", default)]
    pub description: String,
    /// Remote discriminator, e.g. `checklist` or `practice_guide`.
    #[serde(rename = "content_type")]
    pub content_type: String,
    #[serde(rename = "content_data")]
    pub content_data: serde_json::Value,
    #[serde(rename = "tags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "language", default = "default_language")]
    pub language: String,
    #[serde(rename = "author_username")]
    pub author_username: String,
    #[serde(rename = "can_fork", default = "default_can_fork")]
    pub can_fork: bool,
    #[serde(rename = "forked_from_id", default, skip_serializing_if = "Option::is_none")]
    pub forked_from_id: Option<String>,
    #[serde(rename = "published_at", default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_can_fork() -> bool {
    true
}

/// Remote API trait for the shared content backend.
pub trait RemoteApi: Send + Sync {
    /// Create (or idempotently re-create) a published copy.
    fn publish_content<'a>(
        &'a self,
        payload: &'a ContentPublishPayload,
    ) -> RemoteFuture<'a, PublishResponse>;

    /// Remove a published copy.
    fn unpublish_content<'a>(&'a self, public_id: &'a str) -> RemoteFuture<'a, ()>;

    /// Replace the content of a published copy.
    fn update_published_content<'a>(
        &'a self,
        public_id: &'a str,
        payload: &'a ContentPublishPayload,
    ) -> RemoteFuture<'a, UpdateResponse>;

    /// Fetch a published item by its public id.
    fn fetch_public_content<'a>(
        &'a self,
        public_id: &'a str,
    ) -> RemoteFuture<'a, SharedContentDetail>;
}
