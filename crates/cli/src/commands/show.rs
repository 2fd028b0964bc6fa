// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use folio_core::{Content, Database, LibraryContentMetadata};
use serde::Serialize;

use crate::display::format_item_details;
use crate::error::Result;

use super::{open_db, resolve_id, Context};

#[derive(Serialize)]
struct ItemDetails {
    #[serde(flatten)]
    metadata: LibraryContentMetadata,
    content: Content,
    publishable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_error: Option<String>,
}

pub fn run(ctx: &Context, id: &str, json: bool) -> Result<()> {
    let db = open_db(ctx)?;
    let stdout = std::io::stdout();
    run_impl(&db, id, json, &mut stdout.lock())
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(db: &Database, id: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let id = resolve_id(db, id)?;
    let metadata = db.fetch_metadata(&id)?;
    let content = db.fetch_full_content(&id)?;
    let publish_error = folio_sync::validate_for_publish(&content)
        .err()
        .map(|e| e.to_string());

    if json {
        let details = ItemDetails {
            metadata,
            content,
            publishable: publish_error.is_none(),
            publish_error,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&details)?)?;
    } else {
        writeln!(
            out,
            "{}",
            format_item_details(&metadata, &content, publish_error.as_deref())
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
