// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory library: the metadata list plus a memoized full-content cache.
//!
//! The store is the source of truth. This type only fronts it: list mutations
//! go to storage first and are then patched into memory, never the reverse.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OnceCell};

use folio_core::{
    dedup_tags, Checklist, Content, ContentType, FlashcardDeck, ForkProvenance,
    LibraryContentMetadata, NestedIds, PracticeGuide, SyncStatus,
};

use crate::error::{Error, Result};
use crate::id::new_content_id;
use crate::remote::SharedContentDetail;
use crate::storage::Storage;

#[derive(Default)]
struct LibraryState {
    items: Vec<LibraryContentMetadata>,
    loaded: bool,
    /// One cell per id; concurrent readers of the same id share one fetch.
    cache: HashMap<String, Arc<OnceCell<Content>>>,
}

/// Cached view of the user's library.
pub struct LibraryStore {
    storage: Storage,
    state: Mutex<LibraryState>,
    /// Serializes mutations so list patches land in the same order as the
    /// store writes.
    writer: Mutex<()>,
}

impl LibraryStore {
    pub fn new(storage: Storage) -> Self {
        LibraryStore {
            storage,
            state: Mutex::new(LibraryState::default()),
            writer: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ─────────────────────────────────────────────────────────────────────
    // Metadata list
    // ─────────────────────────────────────────────────────────────────────

    /// Reload the metadata list from the store.
    pub async fn load_library(&self) -> Result<Vec<LibraryContentMetadata>> {
        let items = self.storage.fetch_library().await?;
        let mut state = self.state.lock().await;
        state.items = items.clone();
        state.loaded = true;
        Ok(items)
    }

    /// The metadata list, loading it on first use.
    pub async fn library(&self) -> Result<Vec<LibraryContentMetadata>> {
        {
            let state = self.state.lock().await;
            if state.loaded {
                return Ok(state.items.clone());
            }
        }
        self.load_library().await
    }

    /// One metadata row, from memory when the list is loaded.
    pub async fn metadata(&self, id: &str) -> Result<LibraryContentMetadata> {
        {
            let state = self.state.lock().await;
            if let Some(item) = state.items.iter().find(|m| m.id == id) {
                return Ok(item.clone());
            }
        }
        Ok(self.storage.fetch_metadata(id).await?)
    }

    /// Re-read one row from the store, e.g. after a sync pass changed it.
    pub async fn refresh_metadata(&self, id: &str) -> Result<LibraryContentMetadata> {
        let item = self.storage.fetch_metadata(id).await?;
        self.patch_item(item.clone()).await;
        Ok(item)
    }

    /// Re-read the whole list if it is loaded, e.g. after a background drain.
    pub async fn reload_if_loaded(&self) -> Result<bool> {
        let _writer = self.writer.lock().await;
        if !self.state.lock().await.loaded {
            return Ok(false);
        }
        let items = self.storage.fetch_library().await?;
        self.state.lock().await.items = items;
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Full content
    // ─────────────────────────────────────────────────────────────────────

    /// Full body for `id`, read from the store at most once while cached.
    pub async fn fetch_full_content(&self, id: &str) -> Result<Content> {
        let cell = {
            let mut state = self.state.lock().await;
            Arc::clone(state.cache.entry(id.to_string()).or_default())
        };
        if let Some(content) = cell.get() {
            tracing::debug!("Content cache hit for {}", id);
            return Ok(content.clone());
        }

        let storage = self.storage.clone();
        let fetched = cell
            .get_or_try_init(|| async move {
                tracing::debug!("Content cache miss for {}", id);
                storage.fetch_full_content(id).await
            })
            .await;

        match fetched {
            Ok(content) => Ok(content.clone()),
            Err(e) => {
                // Drop the empty cell so a later call retries the read
                let mut state = self.state.lock().await;
                if state
                    .cache
                    .get(id)
                    .is_some_and(|current| Arc::ptr_eq(current, &cell))
                {
                    state.cache.remove(id);
                }
                Err(e.into())
            }
        }
    }

    pub async fn fetch_checklist(&self, id: &str) -> Result<Checklist> {
        self.fetch_full_content(id)
            .await?
            .into_checklist()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub async fn fetch_guide(&self, id: &str) -> Result<PracticeGuide> {
        self.fetch_full_content(id)
            .await?
            .into_guide()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub async fn fetch_deck(&self, id: &str) -> Result<FlashcardDeck> {
        self.fetch_full_content(id)
            .await?
            .into_deck()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    pub async fn create_checklist(
        &self,
        creator_id: &str,
        checklist: Checklist,
        tags: Vec<String>,
        language: &str,
    ) -> Result<LibraryContentMetadata> {
        self.create(creator_id, checklist.into(), tags, language)
            .await
    }

    pub async fn create_guide(
        &self,
        creator_id: &str,
        guide: PracticeGuide,
        tags: Vec<String>,
        language: &str,
    ) -> Result<LibraryContentMetadata> {
        self.create(creator_id, guide.into(), tags, language).await
    }

    pub async fn create_deck(
        &self,
        creator_id: &str,
        deck: FlashcardDeck,
        tags: Vec<String>,
        language: &str,
    ) -> Result<LibraryContentMetadata> {
        self.create(creator_id, deck.into(), tags, language).await
    }

    /// Create a new private item. The content receives a fresh identity.
    async fn create(
        &self,
        creator_id: &str,
        mut content: Content,
        tags: Vec<String>,
        language: &str,
    ) -> Result<LibraryContentMetadata> {
        let id = new_content_id();
        content.assign_ids(id.clone(), NestedIds::FillBlank, new_content_id);

        let mut item = LibraryContentMetadata::new(
            id,
            content.content_type(),
            content.title().to_string(),
            creator_id.to_string(),
            Utc::now(),
        );
        item.description = content.description().to_string();
        item.tags = dedup_tags(tags);
        item.language = language.to_string();

        self.insert(item, content).await
    }

    pub async fn save_checklist(&self, checklist: Checklist) -> Result<LibraryContentMetadata> {
        self.save(checklist.into()).await
    }

    pub async fn save_guide(&self, guide: PracticeGuide) -> Result<LibraryContentMetadata> {
        self.save(guide.into()).await
    }

    pub async fn save_deck(&self, deck: FlashcardDeck) -> Result<LibraryContentMetadata> {
        self.save(deck.into()).await
    }

    /// Persist an edited body and patch its metadata row.
    ///
    /// Visibility, public id and fork provenance carry forward untouched.
    async fn save(&self, content: Content) -> Result<LibraryContentMetadata> {
        let _writer = self.writer.lock().await;

        let stored = self.storage.fetch_metadata(content.id()).await?;
        if stored.content_type != content.content_type() {
            return Err(Error::InvalidContent(format!(
                "'{}' is a {}, not a {}",
                stored.id,
                stored.content_type,
                content.content_type()
            )));
        }

        let title = content.title().to_string();
        let description = content.description().to_string();
        let now = Utc::now();
        let item = self
            .storage
            .save_content_with(&content, move |item| {
                item.title = title;
                item.description = description;
                item.updated_at = now;
                item.sync_status = edited_status(item);
            })
            .await?;

        let mut state = self.state.lock().await;
        replace_item(&mut state, item.clone());
        state.cache.insert(
            item.id.clone(),
            Arc::new(OnceCell::new_with(Some(content))),
        );
        Ok(item)
    }

    /// Replace an item's tags, dropping duplicates and keeping first-seen order.
    pub async fn update_tags(
        &self,
        id: &str,
        tags: Vec<String>,
    ) -> Result<LibraryContentMetadata> {
        let _writer = self.writer.lock().await;
        let tags = dedup_tags(tags);
        let now = Utc::now();
        let item = self
            .storage
            .update_metadata_with(id, move |item| {
                item.tags = tags;
                item.updated_at = now;
                item.sync_status = edited_status(item);
            })
            .await?;
        self.patch_item(item.clone()).await;
        Ok(item)
    }

    /// Pin after every pinned item, or unpin.
    pub async fn toggle_pin(&self, id: &str) -> Result<LibraryContentMetadata> {
        let _writer = self.writer.lock().await;
        let item = self.storage.toggle_pin(id).await?;
        self.patch_item(item.clone()).await;
        Ok(item)
    }

    /// Delete an item. Its body and queued operations go with it.
    pub async fn delete_content(&self, id: &str) -> Result<()> {
        let _writer = self.writer.lock().await;
        self.storage.delete_content(id).await?;
        let mut state = self.state.lock().await;
        state.items.retain(|m| m.id != id);
        state.cache.remove(id);
        Ok(())
    }

    /// Copy a shared item into the library as a new private item.
    ///
    /// Every nested id is regenerated; provenance points at the source.
    pub async fn fork_content(
        &self,
        shared: &SharedContentDetail,
        creator_id: &str,
    ) -> Result<LibraryContentMetadata> {
        if !shared.can_fork {
            return Err(Error::InvalidContent(format!(
                "'{}' does not allow forking",
                shared.public_id
            )));
        }
        let content_type = remote_content_type(&shared.content_type)?;
        let mut content = Content::from_body_json(content_type, shared.content_data.clone())
            .map_err(|e| {
                Error::InvalidContent(format!(
                    "cannot decode shared {} '{}': {}",
                    content_type, shared.public_id, e
                ))
            })?;

        let id = new_content_id();
        content.assign_ids(id.clone(), NestedIds::Regenerate, new_content_id);
        content.set_header(shared.title.clone(), shared.description.clone());

        let mut item = LibraryContentMetadata::new(
            id,
            content_type,
            shared.title.clone(),
            creator_id.to_string(),
            Utc::now(),
        );
        item.description = shared.description.clone();
        item.tags = dedup_tags(shared.tags.iter().cloned());
        item.language = shared.language.clone();
        item.fork = Some(ForkProvenance {
            forked_from_id: shared.id.clone(),
            original_author_username: shared.author_username.clone(),
            original_content_public_id: shared.public_id.clone(),
        });

        let item = self.insert(item, content).await?;
        tracing::info!("Forked {} as {}", shared.public_id, item.id);
        Ok(item)
    }

    /// Persist a new item and add it to the list and cache.
    async fn insert(
        &self,
        item: LibraryContentMetadata,
        content: Content,
    ) -> Result<LibraryContentMetadata> {
        let _writer = self.writer.lock().await;
        self.storage.create_content(&item, &content).await?;

        let mut state = self.state.lock().await;
        replace_item(&mut state, item.clone());
        state.cache.insert(
            item.id.clone(),
            Arc::new(OnceCell::new_with(Some(content))),
        );
        Ok(item)
    }

    async fn patch_item(&self, item: LibraryContentMetadata) {
        let mut state = self.state.lock().await;
        replace_item(&mut state, item);
    }
}

/// Sync status after a local edit.
fn edited_status(item: &LibraryContentMetadata) -> SyncStatus {
    if item.public_id.is_some() {
        SyncStatus::PendingUpdate
    } else {
        SyncStatus::Pending
    }
}

/// Patch one row into a loaded list, keeping store order.
fn replace_item(state: &mut LibraryState, item: LibraryContentMetadata) {
    if !state.loaded {
        return;
    }
    match state.items.iter_mut().find(|m| m.id == item.id) {
        Some(existing) => *existing = item,
        None => state.items.push(item),
    }
    state.items.sort_by(library_order);
}

/// Pinned first by pin order, then most recently updated.
fn library_order(a: &LibraryContentMetadata, b: &LibraryContentMetadata) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| a.pinned_order.cmp(&b.pinned_order))
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Map a backend discriminator to a local content type.
pub fn remote_content_type(discriminator: &str) -> Result<ContentType> {
    match discriminator.to_lowercase().as_str() {
        "checklist" | "checklists" => Ok(ContentType::Checklist),
        "guide" | "practice_guide" | "practiceguide" => Ok(ContentType::Guide),
        "deck" | "flashcard_deck" | "flashcards" | "flashcard" => Ok(ContentType::Deck),
        _ => Err(Error::UnsupportedContentType(discriminator.to_string())),
    }
}

#[cfg(test)]
#[path = "library_tests.rs"]
mod tests;
