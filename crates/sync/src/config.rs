// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine configuration.
//!
//! Deserialized from the `[sync]` table of `folio.toml`; every field has a
//! default so the table may be omitted.

use std::time::Duration;

use folio_core::DEFAULT_MAX_RETRIES;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Failed attempts after which a queue row stops being retried (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Periodic drain interval in seconds (default: 300). 0 = trigger-only.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// First backoff delay after a pass with failures, in milliseconds (default: 2000).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for the backoff delay in seconds (default: 600).
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_interval_secs() -> u64 {
    300
}

fn default_initial_backoff_ms() -> u64 {
    2_000
}

fn default_max_backoff_secs() -> u64 {
    600
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_retries: default_max_retries(),
            interval_secs: default_interval_secs(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl SyncConfig {
    /// Periodic interval, or `None` when timed passes are disabled.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
