// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! folio_cli - Local inspection tool for the folio content library.
//!
//! The `folio` binary opens the same SQLite store the sync engine writes and
//! reports on it: the library list, single items, pin order and the state of
//! the sync queue. It never talks to the backend; `folio retry` only re-arms
//! failed queue rows so the next drain picks them up.
//!
//! # Configuration
//!
//! Settings are read from `folio.toml`, located via `--config`, then the
//! `FOLIO_CONFIG` environment variable, then the user config directory:
//!
//! ```toml
//! database = "library.db"
//!
//! [sync]
//! max_retries = 3
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;

#[cfg(test)]
mod test_helpers;

pub use cli::{Cli, Command, TypeFilter};
pub use config::{Config, ConfigLocation, CONFIG_ENV};
pub use error::{Error, Result};

use commands::Context;

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let location = config::locate(cli.config.as_deref(), std::env::var_os(CONFIG_ENV));
    let config = Config::load_from(location.as_ref())?;
    let db_path = config.db_path(location.as_ref())?;
    tracing::debug!(
        config = ?location.as_ref().map(|l| l.path.display().to_string()),
        database = %db_path.display(),
        "resolved configuration"
    );
    let ctx = Context { config, db_path };

    match cli.command {
        Command::List { json, content_type } => commands::list::run(&ctx, content_type, json),
        Command::Show { id, json } => commands::show::run(&ctx, &id, json),
        Command::Pin { id } => commands::pin::run(&ctx, &id),
        Command::Queue { failed, json } => commands::queue::run(&ctx, failed, json),
        Command::Retry => commands::retry::run(&ctx),
    }
}
