// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod list;
pub mod pin;
pub mod queue;
pub mod retry;
pub mod show;

use std::path::PathBuf;

use folio_core::Database;

use crate::config::Config;
use crate::error::{Error, Result};

/// Resolved settings shared by every command.
pub struct Context {
    pub config: Config,
    pub db_path: PathBuf,
}

impl Context {
    pub fn max_retries(&self) -> u32 {
        self.config.sync.max_retries
    }
}

/// Helper to open the library database for the current context.
pub fn open_db(ctx: &Context) -> Result<Database> {
    tracing::debug!(path = %ctx.db_path.display(), "opening library database");
    Ok(Database::open(&ctx.db_path)?)
}

/// Resolve a full content ID from an exact ID or a unique prefix.
pub(crate) fn resolve_id(db: &Database, prefix: &str) -> Result<String> {
    if db.content_exists(prefix)? {
        return Ok(prefix.to_string());
    }
    let mut matches: Vec<String> = db
        .fetch_library()?
        .into_iter()
        .map(|item| item.id)
        .filter(|id| !prefix.is_empty() && id.starts_with(prefix))
        .collect();
    if matches.len() > 1 {
        return Err(Error::AmbiguousId {
            prefix: prefix.to_string(),
            matches,
        });
    }
    matches
        .pop()
        .ok_or_else(|| Error::NotFound(prefix.to_string()))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
