// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use folio_core::ContentType;

/// Content kind accepted by `--type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TypeFilter {
    Checklist,
    Guide,
    Deck,
}

impl From<TypeFilter> for ContentType {
    fn from(filter: TypeFilter) -> Self {
        match filter {
            TypeFilter::Checklist => ContentType::Checklist,
            TypeFilter::Guide => ContentType::Guide,
            TypeFilter::Deck => ContentType::Deck,
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Inspect the local folio library and its sync queue")]
pub struct Cli {
    /// Path to folio.toml (overrides FOLIO_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List library items, pinned first
    List {
        /// Only list items of this kind
        #[arg(long = "type", short = 't', value_enum)]
        content_type: Option<TypeFilter>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one item with its content
    Show {
        /// Content ID (a unique prefix is enough)
        id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Pin an item to the top of the list, or unpin it
    Pin {
        /// Content ID (a unique prefix is enough)
        id: String,
    },

    /// Show sync queue counts and waiting operations
    Queue {
        /// List operations that exhausted their retries instead
        #[arg(long)]
        failed: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Re-arm failed operations for the next sync pass
    Retry,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
