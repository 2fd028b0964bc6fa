// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use folio_core::Database;

use crate::display::short_id;
use crate::error::Result;

use super::{open_db, resolve_id, Context};

pub fn run(ctx: &Context, id: &str) -> Result<()> {
    let mut db = open_db(ctx)?;
    let stdout = std::io::stdout();
    run_impl(&mut db, id, &mut stdout.lock())
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(db: &mut Database, id: &str, out: &mut impl Write) -> Result<()> {
    let id = resolve_id(db, id)?;
    let item = db.toggle_pin(&id)?;
    tracing::info!(id = %item.id, pinned = item.is_pinned, "toggled pin");

    match item.pinned_order.filter(|_| item.is_pinned) {
        Some(order) => writeln!(
            out,
            "Pinned {}: {} (#{})",
            short_id(&item.id),
            item.title,
            order + 1
        )?,
        None => writeln!(out, "Unpinned {}: {}", short_id(&item.id), item.title)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "pin_tests.rs"]
mod tests;
