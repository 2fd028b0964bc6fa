// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire payloads stored in the sync queue and sent to the backend.
//!
//! Keys are spelled out field by field: the backend contract is snake_case
//! and must not drift with Rust-side renames.

use serde::{Deserialize, Serialize};

use folio_core::{Content, ContentType, LibraryContentMetadata};

use crate::auth::CurrentUser;
use crate::error::{Error, Result};
use crate::id::derive_public_id;

/// Body of a publish or publish_update queue row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPublishPayload {
    #[serde(rename = "title")]
    pub title: String,
    #[serde(rename = "description")]
    pub description: String,
    #[serde(rename = "content_type")]
    pub content_type: ContentType,
    /// The variant body as a JSON object.
    #[serde(rename = "content_data")]
    pub content_data: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "tags")]
    pub tags: Vec<String>,
    #[serde(rename = "language")]
    pub language: String,
    #[serde(rename = "public_id")]
    pub public_id: String,
    #[serde(rename = "can_fork")]
    pub can_fork: bool,
    #[serde(rename = "forked_from_id", default, skip_serializing_if = "Option::is_none")]
    pub forked_from_id: Option<String>,
    #[serde(rename = "author_username", default, skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(
        rename = "original_author_username",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_author_username: Option<String>,
    #[serde(
        rename = "original_content_public_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_content_public_id: Option<String>,
}

impl ContentPublishPayload {
    /// Build a payload from a metadata row and its full snapshot.
    ///
    /// The public id is the row's existing one, or the id derived from the
    /// content id when the item has never been published.
    pub fn from_snapshot(
        metadata: &LibraryContentMetadata,
        content: &Content,
        author: Option<&CurrentUser>,
    ) -> Result<Self> {
        if metadata.id != content.id() {
            return Err(Error::InvalidContent(format!(
                "snapshot '{}' does not belong to '{}'",
                content.id(),
                metadata.id
            )));
        }
        let content_data = match content.body_json()? {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(Error::InvalidContent(
                    "content body is not a JSON object".to_string(),
                ))
            }
        };
        let fork = metadata.fork.as_ref();

        Ok(ContentPublishPayload {
            title: content.title().to_string(),
            description: content.description().to_string(),
            content_type: content.content_type(),
            content_data,
            tags: metadata.tags.clone(),
            language: metadata.language.clone(),
            public_id: metadata
                .public_id
                .clone()
                .unwrap_or_else(|| derive_public_id(&metadata.id)),
            can_fork: true,
            forked_from_id: fork.map(|f| f.forked_from_id.clone()),
            author_username: author.map(|u| u.username.clone()),
            original_author_username: fork.map(|f| f.original_author_username.clone()),
            original_content_public_id: fork.map(|f| f.original_content_public_id.clone()),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Body of an unpublish queue row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpublishPayload {
    #[serde(rename = "public_id")]
    pub public_id: String,
}

impl UnpublishPayload {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
