// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background drain task.
//!
//! Runs one pass at startup, then on every [`SyncScheduler::trigger`] (call
//! it on reconnect and app-foreground) and on a periodic timer. After a pass
//! with failures the timer waits an exponential backoff instead. A pass that
//! delivered anything reloads the library list so cached rows show the new
//! sync state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::library::LibraryStore;
use crate::remote::RemoteApi;
use crate::service::ContentSyncService;

/// Handle to a running drain task.
pub struct SyncScheduler {
    trigger: Arc<Notify>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    /// Spawn the drain task on the current runtime.
    pub fn spawn<R>(
        service: Arc<ContentSyncService<R>>,
        library: Arc<LibraryStore>,
        config: &SyncConfig,
    ) -> Self
    where
        R: RemoteApi + 'static,
    {
        let trigger = Arc::new(Notify::new());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            service,
            library,
            config.interval(),
            Backoff::new(config.initial_backoff(), config.max_backoff()),
            Arc::clone(&trigger),
            cancel.clone(),
        ));
        SyncScheduler {
            trigger,
            cancel,
            handle,
        }
    }

    /// Request a pass as soon as the current one (if any) finishes.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Stop the task. An in-flight pass runs to completion first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!("Sync scheduler task failed: {}", e);
        }
    }
}

async fn run<R: RemoteApi>(
    service: Arc<ContentSyncService<R>>,
    library: Arc<LibraryStore>,
    interval: Option<Duration>,
    mut backoff: Backoff,
    trigger: Arc<Notify>,
    cancel: CancellationToken,
) {
    loop {
        let pass = service.sync_pending().await;
        if let Ok(summary) = &pass {
            if summary.succeeded > 0 {
                if let Err(e) = library.reload_if_loaded().await {
                    tracing::error!("Library reload after sync failed: {}", e);
                }
            }
        }
        match pass {
            Ok(summary) if summary.is_clean() => backoff.reset(),
            Ok(summary) => {
                let delay = backoff.advance();
                tracing::warn!(
                    "{} of {} operations failed; retrying in {:?}",
                    summary.failed,
                    summary.attempted,
                    delay
                );
            }
            Err(e) => {
                let delay = backoff.advance();
                tracing::error!("Sync pass failed: {}; retrying in {:?}", e, delay);
            }
        }

        let wait = backoff.current().or(interval);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = trigger.notified() => {}
            _ = sleep_for(wait) => {}
        }
    }
    tracing::debug!("Sync scheduler stopped");
}

async fn sleep_for(delay: Option<Duration>) {
    match delay {
        Some(delay) => tokio::time::sleep(delay).await,
        None => std::future::pending().await,
    }
}

/// Exponential retry delay, doubling from `initial` up to `max`.
#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    initial: Duration,
    max: Duration,
    current: Option<Duration>,
}

impl Backoff {
    pub(crate) fn new(initial: Duration, max: Duration) -> Self {
        Backoff {
            initial,
            max,
            current: None,
        }
    }

    /// Delay in effect, or `None` after a clean pass.
    pub(crate) fn current(&self) -> Option<Duration> {
        self.current
    }

    /// Record a failed pass and return the next delay.
    pub(crate) fn advance(&mut self) -> Duration {
        let next = match self.current {
            None => self.initial,
            Some(d) => d.saturating_mul(2),
        }
        .min(self.max);
        self.current = Some(next);
        next
    }

    pub(crate) fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
