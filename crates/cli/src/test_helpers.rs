// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for command tests.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use folio_core::{
    Checklist, ChecklistItem, ChecklistSection, Content, ContentType, Database,
    LibraryContentMetadata, OperationKind, Visibility,
};

pub fn setup_db() -> Database {
    Database::open_in_memory().unwrap()
}

/// Insert a one-item checklist under `id`.
pub fn seed_checklist(db: &mut Database, id: &str, title: &str) -> LibraryContentMetadata {
    let meta = LibraryContentMetadata::new(
        id.to_string(),
        ContentType::Checklist,
        title.to_string(),
        "user-alice".to_string(),
        Utc::now(),
    );
    let content = Content::Checklist(Checklist {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        sections: vec![ChecklistSection {
            id: "section-1".to_string(),
            title: "Steps".to_string(),
            items: vec![ChecklistItem {
                id: "item-1".to_string(),
                title: "Step 1".to_string(),
                notes: None,
                is_required: false,
            }],
        }],
    });
    db.create_content(&meta, &content).unwrap();
    meta
}

/// Queue a publish for `content_id` and fail it `attempts` times.
pub fn seed_operation(db: &mut Database, content_id: &str, attempts: u32) -> i64 {
    let op = db
        .enqueue_operation(content_id, OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap();
    for _ in 0..attempts {
        db.increment_retry_count(op, "network failure: offline").unwrap();
    }
    op
}
