// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared async handle over the persistent store.
//!
//! Wraps [`folio_core::Database`] for access from async tasks. Writes are
//! serialized by the mutex and by SQLite transactions.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use folio_core::{
    Content, Database, Error, LibraryContentMetadata, OperationKind, QueueCounts, Result,
    SyncQueueOperation, Visibility,
};

/// Cloneable handle to the library database.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    db: Mutex<Database>,
    /// Number of full-body reads served, for cache diagnostics.
    full_content_reads: AtomicU64,
}

impl Storage {
    pub fn new(db: Database) -> Self {
        Storage {
            inner: Arc::new(StorageInner {
                db: Mutex::new(db),
                full_content_reads: AtomicU64::new(0),
            }),
        }
    }

    /// Open (creating and migrating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Storage::new(Database::open(path)?))
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Storage::new(Database::open_in_memory()?))
    }

    /// Number of full-content reads that reached the database.
    pub fn full_content_reads(&self) -> u64 {
        self.inner.full_content_reads.load(Ordering::Acquire)
    }

    pub async fn create_content(
        &self,
        metadata: &LibraryContentMetadata,
        content: &Content,
    ) -> Result<()> {
        self.inner.db.lock().await.create_content(metadata, content)
    }

    /// Persist an edited body, patching the current stored row under one lock.
    ///
    /// The patch sees the row as stored, not a cached copy, so concurrent sync
    /// completions are never overwritten.
    pub async fn save_content_with<F>(
        &self,
        content: &Content,
        patch: F,
    ) -> Result<LibraryContentMetadata>
    where
        F: FnOnce(&mut LibraryContentMetadata) + Send,
    {
        let mut db = self.inner.db.lock().await;
        let mut item = db.fetch_metadata(content.id())?;
        patch(&mut item);
        db.save_content(content, &item)?;
        Ok(item)
    }

    /// Read-modify-write one metadata row under one lock.
    pub async fn update_metadata_with<F>(
        &self,
        id: &str,
        patch: F,
    ) -> Result<LibraryContentMetadata>
    where
        F: FnOnce(&mut LibraryContentMetadata) + Send,
    {
        let mut db = self.inner.db.lock().await;
        let mut item = db.fetch_metadata(id)?;
        patch(&mut item);
        db.update_metadata(&item)?;
        Ok(item)
    }

    pub async fn toggle_pin(&self, id: &str) -> Result<LibraryContentMetadata> {
        self.inner.db.lock().await.toggle_pin(id)
    }

    pub async fn fetch_library(&self) -> Result<Vec<LibraryContentMetadata>> {
        self.inner.db.lock().await.fetch_library()
    }

    pub async fn fetch_metadata(&self, id: &str) -> Result<LibraryContentMetadata> {
        self.inner.db.lock().await.fetch_metadata(id)
    }

    pub async fn fetch_full_content(&self, id: &str) -> Result<Content> {
        self.inner.full_content_reads.fetch_add(1, Ordering::AcqRel);
        self.inner.db.lock().await.fetch_full_content(id)
    }

    pub async fn delete_content(&self, id: &str) -> Result<()> {
        self.inner.db.lock().await.delete_content(id)
    }

    pub async fn enqueue_operation(
        &self,
        content_id: &str,
        operation: OperationKind,
        visibility: Visibility,
        payload: &[u8],
    ) -> Result<i64> {
        self.inner
            .db
            .lock()
            .await
            .enqueue_operation(content_id, operation, visibility, payload)
    }

    pub async fn get_pending_operations(
        &self,
        max_retries: u32,
    ) -> Result<Vec<SyncQueueOperation>> {
        self.inner.db.lock().await.get_pending_operations(max_retries)
    }

    pub async fn get_failed_operations(
        &self,
        max_retries: u32,
    ) -> Result<Vec<SyncQueueOperation>> {
        self.inner.db.lock().await.get_failed_operations(max_retries)
    }

    pub async fn increment_retry_count(&self, op_id: i64, error_message: &str) -> Result<u32> {
        self.inner
            .db
            .lock()
            .await
            .increment_retry_count(op_id, error_message)
    }

    /// Apply a delivered operation to its content row and drop the queue row.
    ///
    /// Returns `None` when the content was deleted while the operation was in
    /// flight; the queue row is removed either way.
    pub async fn finish_operation<F>(
        &self,
        op_id: i64,
        content_id: &str,
        apply: F,
    ) -> Result<Option<LibraryContentMetadata>>
    where
        F: FnOnce(&mut LibraryContentMetadata) + Send,
    {
        let mut db = self.inner.db.lock().await;
        let mut item = match db.fetch_metadata(content_id) {
            Ok(item) => item,
            Err(Error::NotFound(_)) => {
                db.mark_operation_complete(op_id)?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        apply(&mut item);
        db.complete_operation(op_id, &item)?;
        Ok(Some(item))
    }

    pub async fn reset_failed_operations(&self, max_retries: u32) -> Result<usize> {
        self.inner.db.lock().await.reset_failed_operations(max_retries)
    }

    pub async fn get_queue_counts(&self, max_retries: u32) -> Result<QueueCounts> {
        self.inner.db.lock().await.get_queue_counts(max_retries)
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
