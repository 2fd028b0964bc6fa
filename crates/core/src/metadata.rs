// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Library metadata types.
//!
//! A [`LibraryContentMetadata`] row is the lightweight record shown in list
//! views. The full body lives separately (see [`crate::content`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Discriminator for the kind of content a metadata row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Ordered sections of checkable items.
    Checklist,
    /// Markdown practice guide.
    Guide,
    /// Flashcard deck.
    Deck,
}

impl ContentType {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Checklist => "checklist",
            ContentType::Guide => "guide",
            ContentType::Deck => "deck",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "checklist" => Ok(ContentType::Checklist),
            "guide" => Ok(ContentType::Guide),
            "deck" => Ok(ContentType::Deck),
            _ => Err(Error::InvalidContentType(s.to_string())),
        }
    }
}

/// Sharing scope of a library item.
///
/// Kept separate from any charter visibility; the two have different publish
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only on this device. Initial state for new content.
    #[default]
    Private,
    /// Published, reachable by link but not listed.
    Unlisted,
    /// Published and discoverable.
    Public,
}

impl Visibility {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
            Visibility::Public => "public",
        }
    }

    /// Returns true if a server-side copy exists at this visibility.
    pub fn is_published(&self) -> bool {
        !matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            "public" => Ok(Visibility::Public),
            _ => Err(Error::InvalidVisibility(s.to_string())),
        }
    }
}

/// Local sync state of a metadata row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Never delivered to the backend.
    #[default]
    Pending,
    /// Published earlier, local edits not yet delivered.
    PendingUpdate,
    /// Local state matches the last successful delivery.
    Synced,
}

impl SyncStatus {
    /// Returns the string representation used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::PendingUpdate => "pending_update",
            SyncStatus::Synced => "synced",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SyncStatus::Pending),
            "pending_update" => Ok(SyncStatus::PendingUpdate),
            "synced" => Ok(SyncStatus::Synced),
            _ => Err(Error::InvalidSyncStatus(s.to_string())),
        }
    }
}

/// Attribution linking a forked copy back to its published source.
///
/// The three fields are always set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkProvenance {
    /// Server identifier of the source content.
    pub forked_from_id: String,
    /// Username of the source's author.
    pub original_author_username: String,
    /// Public identifier of the source content.
    pub original_content_public_id: String,
}

/// Lightweight record describing one library item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryContentMetadata {
    /// Local identifier, shared with the content body.
    pub id: String,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub visibility: Visibility,
    /// Identifier of the user who created this local copy.
    pub creator_id: String,
    /// Ordered, duplicate-free tags.
    pub tags: Vec<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sync_status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Server-facing identifier, present once published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork: Option<ForkProvenance>,
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_order: Option<i64>,
}

impl LibraryContentMetadata {
    /// Creates a private, unsynced metadata row.
    pub fn new(
        id: String,
        content_type: ContentType,
        title: String,
        creator_id: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        LibraryContentMetadata {
            id,
            title,
            description: String::new(),
            content_type,
            visibility: Visibility::Private,
            creator_id,
            tags: Vec::new(),
            language: "en".to_string(),
            created_at,
            updated_at: created_at,
            sync_status: SyncStatus::Pending,
            published_at: None,
            public_id: None,
            fork: None,
            is_pinned: false,
            pinned_order: None,
        }
    }

    /// Returns true if the item currently has a live server-side copy.
    pub fn is_published(&self) -> bool {
        self.visibility.is_published() && self.public_id.is_some()
    }
}

/// Removes duplicate tags while keeping first-seen order.
pub fn dedup_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() || out.iter().any(|t| t == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
