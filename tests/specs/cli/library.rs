// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the `folio list`, `folio show` and `folio pin` commands.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use chrono::Utc;
use folio_core::{
    Checklist, ChecklistItem, ChecklistSection, Content, ContentType, Database,
    LibraryContentMetadata, PracticeGuide,
};
use predicates::prelude::*;
use tempfile::TempDir;

/// A temp dir holding `folio.toml` and the library database it points at.
struct Library {
    dir: TempDir,
}

impl Library {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("folio.toml"),
            "database = \"library.db\"\n",
        )
        .unwrap();
        Library { dir }
    }

    fn folio(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("folio");
        cmd.env("FOLIO_CONFIG", self.dir.path().join("folio.toml"));
        cmd
    }

    fn db(&self) -> Database {
        Database::open(&self.dir.path().join("library.db")).unwrap()
    }

    fn add_checklist(&self, id: &str, title: &str) {
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
                id: "s1".to_string(),
                title: "Documents".to_string(),
                items: vec![ChecklistItem {
                    id: "i1".to_string(),
                    title: "Passport".to_string(),
                    notes: None,
                    is_required: true,
                }],
            }],
        });
        self.db().create_content(&meta, &content).unwrap();
    }

    fn add_guide(&self, id: &str, title: &str) {
        let meta = LibraryContentMetadata::new(
            id.to_string(),
            ContentType::Guide,
            title.to_string(),
            "user-alice".to_string(),
            Utc::now(),
        );
        let content = Content::Guide(PracticeGuide {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            markdown: "# Warm up".to_string(),
        });
        self.db().create_content(&meta, &content).unwrap();
    }
}

#[test]
fn list_empty_library() {
    let lib = Library::new();
    lib.folio()
        .arg("list")
        .assert()
        .success()
        .stdout("No library content\n");
}

#[test]
fn list_shows_every_item() {
    let lib = Library::new();
    lib.add_checklist("aaaa0001", "Packing");
    lib.add_guide("bbbb0002", "Scales");

    lib.folio()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("[checklist] (private, pending) aaaa0001: Packing"))
        .stdout(predicate::str::contains("[guide] (private, pending) bbbb0002: Scales"));
}

#[test]
fn list_filters_by_type() {
    let lib = Library::new();
    lib.add_checklist("aaaa0001", "Packing");
    lib.add_guide("bbbb0002", "Scales");

    lib.folio()
        .args(["list", "--type", "guide"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scales"))
        .stdout(predicate::str::contains("Packing").not());
}

#[test]
fn list_json_is_parseable() {
    let lib = Library::new();
    lib.add_checklist("aaaa0001", "Packing");

    let output = lib.folio().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["items"][0]["id"], "aaaa0001");
}

#[test]
fn pin_moves_item_to_top_and_persists() {
    let lib = Library::new();
    lib.add_checklist("aaaa0001", "Alpha");
    lib.add_checklist("bbbb0002", "Bravo");

    lib.folio()
        .args(["pin", "aaaa"])
        .assert()
        .success()
        .stdout("Pinned aaaa0001: Alpha (#1)\n");

    let output = lib.folio().arg("list").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let first = stdout.lines().next().unwrap();
    assert!(first.starts_with("* "), "first line: {first}");
    assert!(first.ends_with("Alpha"), "first line: {first}");

    lib.folio()
        .args(["pin", "aaaa0001"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Unpinned"));
}

#[test]
fn show_prints_body() {
    let lib = Library::new();
    lib.add_checklist("aaaa0001", "Packing");

    lib.folio()
        .args(["show", "aaaa0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Packing"))
        .stdout(predicate::str::contains("- [ ] Passport (required)"));
}

#[test]
fn show_unknown_id_fails() {
    let lib = Library::new();
    lib.folio()
        .args(["show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: content not found: missing"));
}

#[test]
fn show_ambiguous_prefix_fails() {
    let lib = Library::new();
    lib.add_checklist("abc1", "Alpha");
    lib.add_checklist("abc2", "Bravo");

    lib.folio()
        .args(["show", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous content ID 'abc'"));
}

#[test]
fn explicit_missing_config_fails() {
    let lib = Library::new();
    lib.folio()
        .args(["--config", "/nonexistent/folio.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: config error"));
}
