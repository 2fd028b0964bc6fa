// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Visibility transitions: publish, update, unpublish and fork.
//!
//! All checks run before anything is queued. Delivery outcomes come back as
//! a [`SyncSummary`]; a network failure is not an error here.

use std::sync::Arc;

use folio_core::{Content, LibraryContentMetadata, Visibility};

use crate::auth::{AuthProvider, CurrentUser};
use crate::error::{Error, Result};
use crate::library::LibraryStore;
use crate::payload::ContentPublishPayload;
use crate::remote::RemoteApi;
use crate::service::{ContentSyncService, SyncSummary};

/// Minimum title length (after trimming) for publishable content.
pub const MIN_TITLE_LEN: usize = 3;

pub struct VisibilityService<R: RemoteApi, A: AuthProvider> {
    library: Arc<LibraryStore>,
    sync: Arc<ContentSyncService<R>>,
    auth: Arc<A>,
}

impl<R: RemoteApi, A: AuthProvider> VisibilityService<R, A> {
    pub fn new(
        library: Arc<LibraryStore>,
        sync: Arc<ContentSyncService<R>>,
        auth: Arc<A>,
    ) -> Self {
        VisibilityService {
            library,
            sync,
            auth,
        }
    }

    /// Load the signed-in user's profile if it is not cached yet.
    pub async fn ensure_current_user_loaded(&self) -> Result<CurrentUser> {
        self.require_auth()?;
        if let Some(user) = self.auth.current_user() {
            return Ok(user);
        }
        Ok(self.auth.ensure_current_user_loaded().await?)
    }

    /// Publish an item publicly, or push its edits if it already is public.
    pub async fn publish_content(&self, id: &str) -> Result<SyncSummary> {
        self.publish_content_as(id, Visibility::Public).await
    }

    /// Publish an item with an explicit target visibility.
    pub async fn publish_content_as(
        &self,
        id: &str,
        visibility: Visibility,
    ) -> Result<SyncSummary> {
        if !visibility.is_published() {
            return Err(Error::InvalidContent(format!(
                "cannot publish with visibility '{visibility}'"
            )));
        }
        self.require_auth()?;

        // Route on the stored row, which sync passes keep current
        let item = self.library.refresh_metadata(id).await?;
        let content = self.library.fetch_full_content(id).await?;
        validate_for_publish(&content)?;
        let user = self.ensure_current_user_loaded().await?;
        let payload = ContentPublishPayload::from_snapshot(&item, &content, Some(&user))?;

        // A queued unpublish will clear the public id, so an update would land
        // on a removed copy
        let live = item.public_id.is_some() && !self.sync.unpublish_queued(id).await?;
        let summary = if live && item.visibility == visibility {
            self.sync.enqueue_publish_update(id, &payload).await?
        } else {
            self.sync
                .enqueue_publish_with_visibility(id, &payload, visibility)
                .await?
        };

        self.library.refresh_metadata(id).await?;
        Ok(summary)
    }

    /// Remove an item's published copy.
    pub async fn unpublish_content(&self, id: &str) -> Result<SyncSummary> {
        self.require_auth()?;
        let item = self.library.refresh_metadata(id).await?;
        let public_id = item
            .public_id
            .ok_or_else(|| Error::InvalidContent(format!("'{id}' is not published")))?;

        let summary = self.sync.enqueue_unpublish(id, &public_id).await?;
        self.library.refresh_metadata(id).await?;
        Ok(summary)
    }

    /// Fetch a published item by public id and fork it into the library.
    pub async fn fork_public_content(&self, public_id: &str) -> Result<LibraryContentMetadata> {
        let user = self.ensure_current_user_loaded().await?;
        let shared = self.sync.remote().fetch_public_content(public_id).await?;
        self.library.fork_content(&shared, &user.id).await
    }

    fn require_auth(&self) -> Result<()> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }
}

/// Check that content is complete enough to share.
pub fn validate_for_publish(content: &Content) -> Result<()> {
    if content.title().trim().chars().count() < MIN_TITLE_LEN {
        return Err(Error::InvalidContent(format!(
            "title must be at least {MIN_TITLE_LEN} characters"
        )));
    }
    match content {
        Content::Checklist(c) if c.item_count() == 0 => Err(Error::InvalidContent(
            "checklist needs at least one item".to_string(),
        )),
        Content::Guide(g) if g.markdown.trim().is_empty() => Err(Error::InvalidContent(
            "guide body is empty".to_string(),
        )),
        Content::Deck(d) if d.cards.is_empty() => Err(Error::InvalidContent(
            "deck needs at least one card".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
