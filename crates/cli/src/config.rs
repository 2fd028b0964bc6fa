// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI configuration management.
//!
//! Configuration is stored in `folio.toml` and includes:
//! - `database`: Optional path to the library database (relative paths
//!   resolve against the directory holding `folio.toml`)
//! - `[sync]`: Sync engine settings; the CLI reads `max_retries` from it to
//!   split pending from failed queue rows

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use folio_sync::SyncConfig;

use crate::error::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "FOLIO_CONFIG";

const APP_DIR_NAME: &str = "folio";
const CONFIG_FILE_NAME: &str = "folio.toml";
const DB_FILE_NAME: &str = "library.db";

/// Settings stored in `folio.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Optional path for the database (relative to the config file or absolute).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Where the config file is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// True when the path was named explicitly, so a missing file is an error.
    pub required: bool,
}

/// Pick the config file: the `--config` flag, then `FOLIO_CONFIG`, then the
/// user config directory.
pub fn locate(flag: Option<&Path>, env: Option<OsString>) -> Option<ConfigLocation> {
    if let Some(path) = flag {
        return Some(ConfigLocation {
            path: path.to_path_buf(),
            required: true,
        });
    }
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return Some(ConfigLocation {
            path: PathBuf::from(value),
            required: true,
        });
    }
    dirs::config_dir().map(|dir| ConfigLocation {
        path: dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME),
        required: false,
    })
}

impl Config {
    /// Loads configuration from a `folio.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Loads the located file, falling back to defaults when an implicit
    /// location has no file.
    pub fn load_from(location: Option<&ConfigLocation>) -> Result<Self> {
        match location {
            Some(loc) if loc.required || loc.path.exists() => Config::load(&loc.path),
            _ => Ok(Config::default()),
        }
    }

    /// Resolve the database path for this configuration.
    pub fn db_path(&self, location: Option<&ConfigLocation>) -> Result<PathBuf> {
        match &self.database {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => {
                let base = location
                    .and_then(|loc| loc.path.parent())
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                Ok(base.join(path))
            }
            None => default_db_path(),
        }
    }
}

/// `<data dir>/folio/library.db`.
pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DB_FILE_NAME))
        .ok_or_else(|| {
            Error::Config(
                "no data directory for this user\n  hint: set `database` in folio.toml".to_string(),
            )
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
