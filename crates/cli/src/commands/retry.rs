// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use folio_core::Database;

use crate::error::Result;

use super::{open_db, Context};

pub fn run(ctx: &Context) -> Result<()> {
    let mut db = open_db(ctx)?;
    let stdout = std::io::stdout();
    run_impl(&mut db, ctx.max_retries(), &mut stdout.lock())
}

/// Internal implementation that accepts db for testing.
///
/// Only resets retry counters; delivery happens on the engine's next pass.
pub(crate) fn run_impl(db: &mut Database, max_retries: u32, out: &mut impl Write) -> Result<()> {
    let reset = db.reset_failed_operations(max_retries)?;
    if reset == 0 {
        writeln!(out, "No failed operations")?;
        return Ok(());
    }
    tracing::info!(reset, "re-armed failed operations");
    writeln!(
        out,
        "Reset {} failed operation{}; they will be retried on the next sync pass",
        reset,
        if reset == 1 { "" } else { "s" }
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
