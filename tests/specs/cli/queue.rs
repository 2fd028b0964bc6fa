// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the `folio queue` and `folio retry` commands.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use chrono::Utc;
use folio_core::{
    Checklist, Content, ContentType, Database, LibraryContentMetadata, OperationKind, Visibility,
};
use predicates::prelude::*;
use tempfile::TempDir;

fn setup(max_retries: u32) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("folio.toml"),
        format!("database = \"library.db\"\n\n[sync]\nmax_retries = {max_retries}\n"),
    )
    .unwrap();
    dir
}

fn folio(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("folio");
    cmd.env("FOLIO_CONFIG", dir.path().join("folio.toml"));
    cmd
}

/// Add an item with one queued publish that has failed `attempts` times.
fn add_queued(dir: &TempDir, id: &str, attempts: u32) {
    let mut db = Database::open(&dir.path().join("library.db")).unwrap();
    let meta = LibraryContentMetadata::new(
        id.to_string(),
        ContentType::Checklist,
        "Packing".to_string(),
        "user-alice".to_string(),
        Utc::now(),
    );
    let content = Content::Checklist(Checklist {
        id: id.to_string(),
        title: "Packing".to_string(),
        description: String::new(),
        sections: vec![],
    });
    db.create_content(&meta, &content).unwrap();
    let op = db
        .enqueue_operation(id, OperationKind::Publish, Visibility::Public, b"{}")
        .unwrap();
    for _ in 0..attempts {
        db.increment_retry_count(op, "network failure: offline")
            .unwrap();
    }
}

#[test]
fn queue_reports_counts() {
    let dir = setup(3);
    add_queued(&dir, "aaaa0001", 0);
    add_queued(&dir, "bbbb0002", 3);

    folio(&dir)
        .arg("queue")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Queue: 1 pending, 1 failed\n"))
        .stdout(predicate::str::contains("publish aaaa0001 -> public (attempts 0/3)"));
}

#[test]
fn retry_cap_comes_from_config() {
    let dir = setup(5);
    add_queued(&dir, "aaaa0001", 3);

    folio(&dir)
        .arg("queue")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Queue: 1 pending, 0 failed\n"));
}

#[test]
fn retry_rearms_failed_rows() {
    let dir = setup(3);
    add_queued(&dir, "aaaa0001", 3);

    folio(&dir)
        .args(["queue", "--failed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("attempts 3/3"));

    folio(&dir)
        .arg("retry")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Reset 1 failed operation;"));

    folio(&dir)
        .arg("queue")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Queue: 1 pending, 0 failed\n"));
}

#[test]
fn retry_with_nothing_failed() {
    let dir = setup(3);
    folio(&dir)
        .arg("retry")
        .assert()
        .success()
        .stdout("No failed operations\n");
}
