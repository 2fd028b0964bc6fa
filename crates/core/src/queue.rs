// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync queue (outbox) row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::metadata::Visibility;

/// Attempts after which a queue row stops being retried automatically.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// The state change a queue row asks the backend to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// First publication of an item.
    Publish,
    /// Re-delivery of an already published item's content.
    PublishUpdate,
    /// Removal of the server-side copy.
    Unpublish,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Publish => "publish",
            OperationKind::PublishUpdate => "publish_update",
            OperationKind::Unpublish => "unpublish",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "publish" => Ok(OperationKind::Publish),
            "publish_update" => Ok(OperationKind::PublishUpdate),
            "unpublish" => Ok(OperationKind::Unpublish),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

/// One durable row of the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncQueueOperation {
    /// Monotonically increasing row id; defines FIFO order.
    pub id: i64,
    pub content_id: String,
    pub operation: OperationKind,
    /// Visibility the operation moves the item to.
    pub visibility: Visibility,
    /// Opaque serialized wire payload.
    pub payload: Vec<u8>,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SyncQueueOperation {
    /// Returns true once the row has exhausted its automatic attempts.
    pub fn is_failed(&self, max_retries: u32) -> bool {
        self.retry_count >= max_retries
    }
}

/// Outbox totals split by retry state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    /// Rows still eligible for automatic delivery.
    pub pending: usize,
    /// Rows at or above the retry cap.
    pub failed: usize,
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
