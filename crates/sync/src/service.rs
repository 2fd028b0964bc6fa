// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Content sync service: the outbox writer and drain loop.
//!
//! Every mutation bound for the backend is first written to the sync queue,
//! then delivered by [`ContentSyncService::sync_pending`]. Rows are delivered
//! one at a time in creation order. A failed delivery is recorded on the row
//! and retried on a later pass until the retry cap is reached.
//!
//! Rows for one content id are delivered strictly in order: while an older
//! row for an item is undelivered (failed this pass, or capped), its newer
//! rows are deferred.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use folio_core::{
    LibraryContentMetadata, OperationKind, QueueCounts, SyncQueueOperation, SyncStatus,
    Visibility,
};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::payload::{ContentPublishPayload, UnpublishPayload};
use crate::remote::{PublishResponse, RemoteApi, UpdateResponse};
use crate::storage::Storage;

/// Outcome counts of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Rows held back behind an undelivered older row for the same item.
    pub deferred: usize,
}

impl SyncSummary {
    /// True if every attempted row was delivered.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Result of a successful remote call, before it is applied locally.
enum Delivery {
    Published(PublishResponse),
    Updated(UpdateResponse),
    Unpublished,
}

/// Durable outbox and its delivery loop.
pub struct ContentSyncService<R: RemoteApi> {
    storage: Storage,
    remote: Arc<R>,
    max_retries: u32,
    /// Held for the duration of a pass; passes never overlap.
    drain_lock: Mutex<()>,
}

impl<R: RemoteApi> ContentSyncService<R> {
    pub fn new(storage: Storage, remote: Arc<R>, config: &SyncConfig) -> Self {
        ContentSyncService {
            storage,
            remote,
            max_retries: config.max_retries,
            drain_lock: Mutex::new(()),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Deliver every pending row, oldest first.
    ///
    /// A caller arriving while a pass is running waits for it, then drains
    /// whatever is still pending. Storage faults abort the pass; delivery
    /// failures are counted in the summary.
    pub async fn sync_pending(&self) -> Result<SyncSummary> {
        let _pass = self.drain_lock.lock().await;

        let pending = self.storage.get_pending_operations(self.max_retries).await?;
        let mut summary = SyncSummary::default();
        if pending.is_empty() {
            return Ok(summary);
        }
        tracing::debug!("Draining {} queued operations", pending.len());

        // content id -> oldest undelivered row id
        let mut blocked: HashMap<String, i64> = HashMap::new();
        for op in self.storage.get_failed_operations(self.max_retries).await? {
            blocked
                .entry(op.content_id)
                .and_modify(|first| *first = (*first).min(op.id))
                .or_insert(op.id);
        }

        for op in pending {
            if blocked
                .get(&op.content_id)
                .is_some_and(|&first| first < op.id)
            {
                summary.deferred += 1;
                tracing::debug!(
                    "Deferring {} for {} (op {}) behind an undelivered row",
                    op.operation,
                    op.content_id,
                    op.id
                );
                continue;
            }
            summary.attempted += 1;
            match self.deliver(&op).await {
                Ok(delivery) => {
                    self.apply(&op, delivery).await?;
                    summary.succeeded += 1;
                    tracing::info!(
                        "Delivered {} for {} (op {})",
                        op.operation,
                        op.content_id,
                        op.id
                    );
                }
                Err(err) => {
                    self.record_failure(&op, &err).await?;
                    summary.failed += 1;
                    blocked.entry(op.content_id.clone()).or_insert(op.id);
                }
            }
        }

        Ok(summary)
    }

    /// Queue a publish targeting public visibility, then drain.
    pub async fn enqueue_publish(
        &self,
        content_id: &str,
        payload: &ContentPublishPayload,
    ) -> Result<SyncSummary> {
        self.enqueue_publish_with_visibility(content_id, payload, Visibility::Public)
            .await
    }

    /// Queue a publish targeting `visibility`, then drain.
    pub async fn enqueue_publish_with_visibility(
        &self,
        content_id: &str,
        payload: &ContentPublishPayload,
        visibility: Visibility,
    ) -> Result<SyncSummary> {
        if !visibility.is_published() {
            return Err(Error::InvalidContent(format!(
                "cannot publish with visibility '{visibility}'"
            )));
        }
        self.storage
            .enqueue_operation(
                content_id,
                OperationKind::Publish,
                visibility,
                &payload.to_bytes()?,
            )
            .await?;
        self.sync_pending().await
    }

    /// Queue a content update for an already-published item, then drain.
    ///
    /// The row carries the item's current visibility, which delivery never
    /// changes.
    pub async fn enqueue_publish_update(
        &self,
        content_id: &str,
        payload: &ContentPublishPayload,
    ) -> Result<SyncSummary> {
        let item = self.storage.fetch_metadata(content_id).await?;
        self.storage
            .enqueue_operation(
                content_id,
                OperationKind::PublishUpdate,
                item.visibility,
                &payload.to_bytes()?,
            )
            .await?;
        self.sync_pending().await
    }

    /// Queue removal of the published copy, then drain.
    pub async fn enqueue_unpublish(&self, content_id: &str, public_id: &str) -> Result<SyncSummary> {
        let payload = UnpublishPayload {
            public_id: public_id.to_string(),
        };
        self.storage
            .enqueue_operation(
                content_id,
                OperationKind::Unpublish,
                Visibility::Private,
                &payload.to_bytes()?,
            )
            .await?;
        self.sync_pending().await
    }

    pub async fn queue_counts(&self) -> Result<QueueCounts> {
        Ok(self.storage.get_queue_counts(self.max_retries).await?)
    }

    pub async fn pending_operations(&self) -> Result<Vec<SyncQueueOperation>> {
        Ok(self.storage.get_pending_operations(self.max_retries).await?)
    }

    pub async fn failed_operations(&self) -> Result<Vec<SyncQueueOperation>> {
        Ok(self.storage.get_failed_operations(self.max_retries).await?)
    }

    /// True if an unpublish for the item is still waiting for delivery.
    pub async fn unpublish_queued(&self, content_id: &str) -> Result<bool> {
        let pending = self.storage.get_pending_operations(self.max_retries).await?;
        let failed = self.storage.get_failed_operations(self.max_retries).await?;
        Ok(pending
            .iter()
            .chain(failed.iter())
            .any(|op| op.content_id == content_id && op.operation == OperationKind::Unpublish))
    }

    /// Make failed rows eligible again and drain.
    pub async fn retry_failed(&self) -> Result<SyncSummary> {
        let reset = self
            .storage
            .reset_failed_operations(self.max_retries)
            .await?;
        if reset > 0 {
            tracing::info!("Retrying {} failed operations", reset);
        }
        self.sync_pending().await
    }

    /// Decode the row and make the matching remote call.
    async fn deliver(&self, op: &SyncQueueOperation) -> Result<Delivery> {
        match op.operation {
            OperationKind::Publish => {
                let payload = ContentPublishPayload::from_bytes(&op.payload)?;
                let response = self.remote.publish_content(&payload).await?;
                Ok(Delivery::Published(response))
            }
            OperationKind::PublishUpdate => {
                let payload = ContentPublishPayload::from_bytes(&op.payload)?;
                let response = self
                    .remote
                    .update_published_content(&payload.public_id, &payload)
                    .await?;
                Ok(Delivery::Updated(response))
            }
            OperationKind::Unpublish => {
                let payload = UnpublishPayload::from_bytes(&op.payload)?;
                self.remote.unpublish_content(&payload.public_id).await?;
                Ok(Delivery::Unpublished)
            }
        }
    }

    /// Commit a successful delivery to the content row and drop the queue row.
    async fn apply(&self, op: &SyncQueueOperation, delivery: Delivery) -> Result<()> {
        let target = op.visibility;
        let enqueued_at = op.created_at;
        let applied = self
            .storage
            .finish_operation(op.id, &op.content_id, move |item| {
                apply_delivery(item, target, enqueued_at, delivery)
            })
            .await?;
        if applied.is_none() {
            tracing::debug!(
                "Content {} was deleted before op {} completed",
                op.content_id,
                op.id
            );
        }
        Ok(())
    }

    async fn record_failure(&self, op: &SyncQueueOperation, err: &Error) -> Result<()> {
        let message = err.to_string();
        match self.storage.increment_retry_count(op.id, &message).await {
            Ok(count) if count >= self.max_retries => {
                tracing::warn!(
                    "Giving up on {} for {} after {} attempts: {}",
                    op.operation,
                    op.content_id,
                    count,
                    message
                );
            }
            Ok(count) => {
                tracing::warn!(
                    "Failed {} for {} (attempt {}/{}): {}",
                    op.operation,
                    op.content_id,
                    count,
                    self.max_retries,
                    message
                );
            }
            // Row cascaded away with its content mid-pass
            Err(folio_core::Error::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

/// Metadata transition for a delivered operation.
///
/// Edits saved after the row was queued are not in the delivered payload, so
/// the item stays `pending_update` instead of `synced`.
fn apply_delivery(
    item: &mut LibraryContentMetadata,
    target: Visibility,
    enqueued_at: chrono::DateTime<chrono::Utc>,
    delivery: Delivery,
) {
    let status = if item.updated_at > enqueued_at {
        SyncStatus::PendingUpdate
    } else {
        SyncStatus::Synced
    };
    match delivery {
        Delivery::Published(response) => {
            item.visibility = target;
            item.public_id = Some(response.public_id);
            item.published_at = Some(response.published_at);
            item.sync_status = status;
        }
        Delivery::Updated(response) => {
            // An unpublish landed first; the update reached a copy that is gone
            if item.is_published() && item.public_id.as_deref() == Some(&response.public_id) {
                item.sync_status = status;
            }
        }
        Delivery::Unpublished => {
            item.visibility = Visibility::Private;
            item.public_id = None;
            item.published_at = None;
            item.sync_status = SyncStatus::Synced;
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
