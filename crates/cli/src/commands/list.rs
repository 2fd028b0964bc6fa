// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use folio_core::{ContentType, Database, LibraryContentMetadata};
use serde::Serialize;

use crate::cli::TypeFilter;
use crate::display::format_item_line;
use crate::error::Result;

use super::{open_db, Context};

/// JSON output structure for the list command.
#[derive(Serialize)]
struct ListOutputJson {
    items: Vec<LibraryContentMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<ContentType>,
}

pub fn run(ctx: &Context, content_type: Option<TypeFilter>, json: bool) -> Result<()> {
    let db = open_db(ctx)?;
    let stdout = std::io::stdout();
    run_impl(&db, content_type.map(ContentType::from), json, &mut stdout.lock())
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(
    db: &Database,
    content_type: Option<ContentType>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let items: Vec<LibraryContentMetadata> = db
        .fetch_library()?
        .into_iter()
        .filter(|item| content_type.is_none_or(|t| item.content_type == t))
        .collect();

    if json {
        let output = ListOutputJson {
            items,
            content_type,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    if items.is_empty() {
        writeln!(out, "No library content")?;
        return Ok(());
    }
    for item in &items {
        writeln!(out, "{}", format_item_line(item))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
