// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use chrono::{DateTime, Utc};
use folio_core::{Database, OperationKind, QueueCounts, SyncQueueOperation, Visibility};
use serde::Serialize;

use crate::display::{format_operation_line, format_queue_counts};
use crate::error::Result;

use super::{open_db, Context};

/// JSON representation of a queue row; the wire payload is left out.
#[derive(Serialize)]
struct OperationJson {
    id: i64,
    content_id: String,
    operation: OperationKind,
    visibility: Visibility,
    retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SyncQueueOperation> for OperationJson {
    fn from(op: SyncQueueOperation) -> Self {
        OperationJson {
            id: op.id,
            content_id: op.content_id,
            operation: op.operation,
            visibility: op.visibility,
            retry_count: op.retry_count,
            last_error: op.last_error,
            created_at: op.created_at,
        }
    }
}

#[derive(Serialize)]
struct QueueOutputJson {
    counts: QueueCounts,
    max_retries: u32,
    operations: Vec<OperationJson>,
}

pub fn run(ctx: &Context, failed: bool, json: bool) -> Result<()> {
    let db = open_db(ctx)?;
    let stdout = std::io::stdout();
    run_impl(&db, ctx.max_retries(), failed, json, &mut stdout.lock())
}

/// Internal implementation that accepts db for testing.
///
/// Lists pending rows, or failed rows when `failed` is set.
pub(crate) fn run_impl(
    db: &Database,
    max_retries: u32,
    failed: bool,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let counts = db.get_queue_counts(max_retries)?;
    let operations = if failed {
        db.get_failed_operations(max_retries)?
    } else {
        db.get_pending_operations(max_retries)?
    };

    if json {
        let output = QueueOutputJson {
            counts,
            max_retries,
            operations: operations.into_iter().map(OperationJson::from).collect(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    writeln!(out, "{}", format_queue_counts(&counts))?;
    for op in &operations {
        writeln!(out, "{}", format_operation_line(op, max_retries))?;
    }
    if failed && counts.failed > 0 {
        writeln!(out, "\nRun 'folio retry' to re-arm failed operations.")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
