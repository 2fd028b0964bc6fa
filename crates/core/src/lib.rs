// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! folio-core: Shared library for the folio content library
//!
//! This crate provides the data model (metadata rows, content bodies, outbox
//! rows) and the SQLite persistent store used by the sync engine and the
//! `folio` CLI.

pub mod content;
pub mod db;
pub mod error;
pub mod metadata;
pub mod queue;

pub use content::{
    Checklist, ChecklistItem, ChecklistSection, Content, Flashcard, FlashcardDeck, NestedIds,
    PracticeGuide,
};
pub use db::Database;
pub use error::{Error, Result};
pub use metadata::{
    dedup_tags, ContentType, ForkProvenance, LibraryContentMetadata, SyncStatus, Visibility,
};
pub use queue::{OperationKind, QueueCounts, SyncQueueOperation, DEFAULT_MAX_RETRIES};
