// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::content::{Checklist, ChecklistItem, ChecklistSection, PracticeGuide};
use crate::metadata::SyncStatus;
use crate::queue::DEFAULT_MAX_RETRIES;
use chrono::Utc;

fn test_checklist(id: &str, title: &str) -> (LibraryContentMetadata, Content) {
    let meta = LibraryContentMetadata::new(
        id.to_string(),
        ContentType::Checklist,
        title.to_string(),
        "user-1".to_string(),
        Utc::now(),
    );
    let content = Content::Checklist(Checklist {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        sections: vec![ChecklistSection {
            id: "s-1".into(),
            title: "Main".into(),
            items: vec![ChecklistItem {
                id: "i-1".into(),
                title: "Step one".into(),
                notes: None,
                is_required: true,
            }],
        }],
    });
    (meta, content)
}

fn seeded(ids: &[&str]) -> Database {
    let mut db = Database::open_in_memory().unwrap();
    for id in ids {
        let (meta, content) = test_checklist(id, "Checklist");
        db.create_content(&meta, &content).unwrap();
    }
    db
}

#[test]
fn create_and_fetch_content() {
    let db = seeded(&["c-1"]);

    let meta = db.fetch_metadata("c-1").unwrap();
    assert_eq!(meta.title, "Checklist");
    assert_eq!(meta.visibility, Visibility::Private);
    assert_eq!(meta.sync_status, SyncStatus::Pending);

    let content = db.fetch_full_content("c-1").unwrap();
    assert_eq!(content.as_checklist().unwrap().item_count(), 1);
}

#[test]
fn create_rejects_mismatched_body() {
    let mut db = Database::open_in_memory().unwrap();
    let (meta, _) = test_checklist("c-1", "Checklist");
    let guide = Content::Guide(PracticeGuide {
        id: "c-1".into(),
        title: "Guide".into(),
        description: String::new(),
        markdown: "# Hi".into(),
    });

    let err = db.create_content(&meta, &guide).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(!db.content_exists("c-1").unwrap());
}

#[test]
fn create_duplicate_id_is_constraint_violation() {
    let mut db = seeded(&["c-1"]);
    let (meta, content) = test_checklist("c-1", "Again");
    let err = db.create_content(&meta, &content).unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[test]
fn fetch_missing_content_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(db.fetch_full_content("nope"), Err(Error::NotFound(_))));
    assert!(matches!(db.fetch_metadata("nope"), Err(Error::NotFound(_))));
}

#[test]
fn update_metadata_round_trips_all_fields() {
    let mut db = seeded(&["c-1"]);
    let mut meta = db.fetch_metadata("c-1").unwrap();
    meta.visibility = Visibility::Public;
    meta.public_id = Some("pub-abc".into());
    meta.published_at = Some(Utc::now());
    meta.sync_status = SyncStatus::Synced;
    meta.tags = vec!["aviation".into(), "safety".into()];
    meta.fork = Some(ForkProvenance {
        forked_from_id: "srv-9".into(),
        original_author_username: "amelia".into(),
        original_content_public_id: "pub-src".into(),
    });
    meta.is_pinned = true;
    meta.pinned_order = Some(4);

    db.update_metadata(&meta).unwrap();
    let stored = db.fetch_metadata("c-1").unwrap();

    assert_eq!(stored.visibility, Visibility::Public);
    assert_eq!(stored.public_id.as_deref(), Some("pub-abc"));
    assert_eq!(stored.tags, vec!["aviation", "safety"]);
    assert_eq!(stored.fork, meta.fork);
    assert_eq!(stored.pinned_order, Some(4));
    assert!(stored.published_at.is_some());
}

#[test]
fn update_missing_metadata_is_not_found() {
    let mut db = Database::open_in_memory().unwrap();
    let (meta, _) = test_checklist("ghost", "Ghost");
    assert!(matches!(db.update_metadata(&meta), Err(Error::NotFound(_))));
}

#[test]
fn partial_fork_provenance_is_corrupted_data() {
    let db = seeded(&["c-1"]);
    db.conn
        .execute(
            "UPDATE library_content SET forked_from_id = 'srv-1' WHERE id = 'c-1'",
            [],
        )
        .unwrap();
    assert!(db.fetch_metadata("c-1").is_err());
}

#[test]
fn save_content_replaces_body_and_metadata() {
    let mut db = seeded(&["c-1"]);
    let mut meta = db.fetch_metadata("c-1").unwrap();
    let (_, mut content) = test_checklist("c-1", "Renamed");
    if let Content::Checklist(ref mut c) = content {
        c.sections[0].items.push(ChecklistItem {
            id: "i-2".into(),
            title: "Step two".into(),
            notes: None,
            is_required: false,
        });
    }
    meta.title = "Renamed".into();

    db.save_content(&content, &meta).unwrap();

    assert_eq!(db.fetch_metadata("c-1").unwrap().title, "Renamed");
    let stored = db.fetch_full_content("c-1").unwrap();
    assert_eq!(stored.as_checklist().unwrap().item_count(), 2);
}

#[test]
fn fetch_library_orders_pinned_first() {
    let mut db = seeded(&["a", "b", "c"]);
    for (id, order) in [("c", 1), ("a", 2)] {
        let mut meta = db.fetch_metadata(id).unwrap();
        meta.is_pinned = true;
        meta.pinned_order = Some(order);
        db.update_metadata(&meta).unwrap();
    }

    let ids: Vec<String> = db.fetch_library().unwrap().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    assert_eq!(db.max_pinned_order().unwrap(), Some(2));
}

#[test]
fn max_pinned_order_empty() {
    let db = seeded(&["a"]);
    assert_eq!(db.max_pinned_order().unwrap(), None);
}

#[test]
fn toggle_pin_appends_and_clears() {
    let mut db = seeded(&["a", "b"]);

    let a = db.toggle_pin("a").unwrap();
    assert!(a.is_pinned);
    assert_eq!(a.pinned_order, Some(0));

    let b = db.toggle_pin("b").unwrap();
    assert_eq!(b.pinned_order, Some(1));

    let a = db.toggle_pin("a").unwrap();
    assert!(!a.is_pinned);
    assert_eq!(a.pinned_order, None);
    assert_eq!(db.fetch_metadata("a").unwrap().pinned_order, None);

    // Re-pinning goes after the remaining pinned item
    let a = db.toggle_pin("a").unwrap();
    assert_eq!(a.pinned_order, Some(2));
}

#[test]
fn toggle_pin_missing_is_not_found() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(matches!(db.toggle_pin("ghost"), Err(Error::NotFound(_))));
}

#[test]
fn enqueue_unknown_content_is_constraint_violation() {
    let mut db = Database::open_in_memory().unwrap();
    let err = db
        .enqueue_operation("ghost", OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
    assert_eq!(db.get_queue_counts(DEFAULT_MAX_RETRIES).unwrap().pending, 0);
}

#[test]
fn pending_operations_are_fifo() {
    let mut db = seeded(&["a", "b"]);
    let first = db
        .enqueue_operation("b", OperationKind::Publish, Visibility::Public, b"1")
        .unwrap();
    let second = db
        .enqueue_operation("a", OperationKind::Publish, Visibility::Public, b"2")
        .unwrap();
    let third = db
        .enqueue_operation("b", OperationKind::PublishUpdate, Visibility::Public, b"3")
        .unwrap();

    let ops = db.get_pending_operations(DEFAULT_MAX_RETRIES).unwrap();
    let ids: Vec<i64> = ops.iter().map(|op| op.id).collect();
    assert_eq!(ids, vec![first, second, third]);
    assert!(first < second && second < third);
    assert_eq!(ops[2].operation, OperationKind::PublishUpdate);
    assert_eq!(ops[0].payload, b"1".to_vec());
    assert_eq!(ops[0].retry_count, 0);
}

#[test]
fn retry_cap_moves_row_to_failed() {
    let mut db = seeded(&["a"]);
    let id = db
        .enqueue_operation("a", OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap();

    for expected in 1..=3 {
        let count = db.increment_retry_count(id, "timeout").unwrap();
        assert_eq!(count, expected);
    }

    assert!(db.get_pending_operations(DEFAULT_MAX_RETRIES).unwrap().is_empty());
    let failed = db.get_failed_operations(DEFAULT_MAX_RETRIES).unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].last_error.as_deref(), Some("timeout"));
    assert_eq!(
        db.get_queue_counts(DEFAULT_MAX_RETRIES).unwrap(),
        QueueCounts { pending: 0, failed: 1 }
    );
}

#[test]
fn increment_missing_operation_is_not_found() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(matches!(
        db.increment_retry_count(42, "boom"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn reset_failed_operations_makes_rows_pending() {
    let mut db = seeded(&["a"]);
    let id = db
        .enqueue_operation("a", OperationKind::Unpublish, Visibility::Private, b"{}")
        .unwrap();
    for _ in 0..3 {
        db.increment_retry_count(id, "offline").unwrap();
    }

    assert_eq!(db.reset_failed_operations(DEFAULT_MAX_RETRIES).unwrap(), 1);
    let pending = db.get_pending_operations(DEFAULT_MAX_RETRIES).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].retry_count, 0);
    assert_eq!(pending[0].last_error.as_deref(), Some("offline"));
}

#[test]
fn mark_operation_complete_removes_row() {
    let mut db = seeded(&["a"]);
    let id = db
        .enqueue_operation("a", OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap();

    assert!(db.mark_operation_complete(id).unwrap());
    assert!(!db.mark_operation_complete(id).unwrap());
    assert_eq!(db.get_queue_counts(DEFAULT_MAX_RETRIES).unwrap(), QueueCounts::default());
}

#[test]
fn complete_operation_updates_metadata_atomically() {
    let mut db = seeded(&["a"]);
    let id = db
        .enqueue_operation("a", OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap();
    let mut meta = db.fetch_metadata("a").unwrap();
    meta.visibility = Visibility::Public;
    meta.public_id = Some("pub-a".into());
    meta.sync_status = SyncStatus::Synced;

    db.complete_operation(id, &meta).unwrap();

    assert_eq!(db.fetch_metadata("a").unwrap().visibility, Visibility::Public);
    assert!(db.get_pending_operations(DEFAULT_MAX_RETRIES).unwrap().is_empty());
}

#[test]
fn delete_content_cascades_body_and_queue() {
    let mut db = seeded(&["a", "b"]);
    db.enqueue_operation("a", OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap();
    db.enqueue_operation("b", OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap();

    db.delete_content("a").unwrap();

    assert!(matches!(db.fetch_full_content("a"), Err(Error::NotFound(_))));
    let pending = db.get_pending_operations(DEFAULT_MAX_RETRIES).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].content_id, "b");
    assert!(matches!(db.delete_content("a"), Err(Error::NotFound(_))));
}

#[test]
fn open_on_disk_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("library.db");
    {
        let mut db = Database::open(&path).unwrap();
        let (meta, content) = test_checklist("c-1", "Durable");
        db.create_content(&meta, &content).unwrap();
        db.enqueue_operation("c-1", OperationKind::Publish, Visibility::Public, b"{}")
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.fetch_metadata("c-1").unwrap().title, "Durable");
    assert_eq!(db.get_queue_counts(DEFAULT_MAX_RETRIES).unwrap().pending, 1);
}

#[test]
fn migration_adds_pin_columns_to_old_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE library_content (
            id TEXT PRIMARY KEY, title TEXT NOT NULL, description TEXT NOT NULL DEFAULT '',
            type TEXT NOT NULL, visibility TEXT NOT NULL DEFAULT 'private',
            creator_id TEXT NOT NULL, tags TEXT NOT NULL DEFAULT '[]',
            language TEXT NOT NULL DEFAULT 'en', created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL, sync_status TEXT NOT NULL DEFAULT 'pending',
            published_at TEXT, public_id TEXT, forked_from_id TEXT,
            original_author_username TEXT, original_content_public_id TEXT
        );",
    )
    .unwrap();

    run_migrations(&conn).unwrap();

    let has_pin: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('library_content') WHERE name = 'pinned_order'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(has_pin);
}
