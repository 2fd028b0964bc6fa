// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed persistent store for library content.
//!
//! The [`Database`] struct owns content metadata, full content bodies, and
//! the sync queue (outbox). Every write runs inside a transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

use crate::content::Content;
use crate::error::{Error, Result};
use crate::metadata::{ContentType, ForkProvenance, LibraryContentMetadata, Visibility};
use crate::queue::{OperationKind, QueueCounts, SyncQueueOperation};

/// SQL schema for the library database.
pub const SCHEMA: &str = r#"
-- Lightweight metadata, one row per library item
CREATE TABLE IF NOT EXISTS library_content (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL,
    visibility TEXT NOT NULL DEFAULT 'private',
    creator_id TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',      -- JSON array, ordered
    language TEXT NOT NULL DEFAULT 'en',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    sync_status TEXT NOT NULL DEFAULT 'pending',
    published_at TEXT,
    public_id TEXT,
    forked_from_id TEXT,
    original_author_username TEXT,
    original_content_public_id TEXT,
    is_pinned INTEGER NOT NULL DEFAULT 0,
    pinned_order INTEGER
);

-- Full bodies, stored as the variant's JSON
CREATE TABLE IF NOT EXISTS library_content_body (
    content_id TEXT PRIMARY KEY,
    type TEXT NOT NULL,
    data TEXT NOT NULL,
    FOREIGN KEY (content_id) REFERENCES library_content(id) ON DELETE CASCADE
);

-- Outbox of pending state changes
CREATE TABLE IF NOT EXISTS sync_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content_id TEXT NOT NULL,
    operation TEXT NOT NULL,             -- publish|publish_update|unpublish
    visibility TEXT NOT NULL,
    payload BLOB NOT NULL,
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (content_id) REFERENCES library_content(id) ON DELETE CASCADE
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_library_updated ON library_content(updated_at DESC);
CREATE INDEX IF NOT EXISTS idx_library_public_id ON library_content(public_id);
CREATE INDEX IF NOT EXISTS idx_sync_queue_content ON sync_queue(content_id);
CREATE INDEX IF NOT EXISTS idx_sync_queue_retry ON sync_queue(retry_count);
"#;

const METADATA_COLUMNS: &str = "id, title, description, type, visibility, creator_id, tags,
    language, created_at, updated_at, sync_status, published_at, public_id,
    forked_from_id, original_author_username, original_content_public_id,
    is_pinned, pinned_order";

const QUEUE_COLUMNS: &str =
    "id, content_id, operation, visibility, payload, retry_count, last_error, created_at";

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value
        .parse()
        .map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

fn parse_timestamp_opt(
    value: Option<String>,
    column: &str,
) -> std::result::Result<Option<DateTime<Utc>>, rusqlite::Error> {
    value.map(|s| parse_timestamp(&s, column)).transpose()
}

fn parse_fork(
    forked_from_id: Option<String>,
    author: Option<String>,
    public_id: Option<String>,
) -> std::result::Result<Option<ForkProvenance>, rusqlite::Error> {
    match (forked_from_id, author, public_id) {
        (None, None, None) => Ok(None),
        (Some(forked_from_id), Some(original_author_username), Some(original_content_public_id)) => {
            Ok(Some(ForkProvenance {
                forked_from_id,
                original_author_username,
                original_content_public_id,
            }))
        }
        _ => Err(corrupted("partial fork provenance".to_string())),
    }
}

fn row_to_metadata(row: &Row<'_>) -> std::result::Result<LibraryContentMetadata, rusqlite::Error> {
    let type_str: String = row.get(3)?;
    let visibility_str: String = row.get(4)?;
    let tags_json: String = row.get(6)?;
    let created_str: String = row.get(8)?;
    let updated_str: String = row.get(9)?;
    let status_str: String = row.get(10)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|_| corrupted(format!("invalid tags '{tags_json}'")))?;

    Ok(LibraryContentMetadata {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        content_type: parse_db(&type_str, "type")?,
        visibility: parse_db(&visibility_str, "visibility")?,
        creator_id: row.get(5)?,
        tags,
        language: row.get(7)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
        sync_status: parse_db(&status_str, "sync_status")?,
        published_at: parse_timestamp_opt(row.get(11)?, "published_at")?,
        public_id: row.get(12)?,
        fork: parse_fork(row.get(13)?, row.get(14)?, row.get(15)?)?,
        is_pinned: row.get(16)?,
        pinned_order: row.get(17)?,
    })
}

fn row_to_operation(row: &Row<'_>) -> std::result::Result<SyncQueueOperation, rusqlite::Error> {
    let op_str: String = row.get(2)?;
    let visibility_str: String = row.get(3)?;
    let created_str: String = row.get(7)?;
    Ok(SyncQueueOperation {
        id: row.get(0)?,
        content_id: row.get(1)?,
        operation: parse_db(&op_str, "operation")?,
        visibility: parse_db(&visibility_str, "visibility")?,
        payload: row.get(4)?,
        retry_count: row.get(5)?,
        last_error: row.get(6)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

/// Lift SQLite constraint failures into [`Error::ConstraintViolation`].
fn map_constraint(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, ref msg) if e.code == ErrorCode::ConstraintViolation => {
            Error::ConstraintViolation(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        other => Error::Database(other),
    }
}

fn tags_to_json(tags: &[String]) -> Result<String> {
    Ok(serde_json::to_string(tags)?)
}

fn ensure_matches(metadata: &LibraryContentMetadata, content: &Content) -> Result<()> {
    if metadata.id != content.id() {
        return Err(Error::InvalidInput(format!(
            "content id '{}' does not match metadata id '{}'",
            content.id(),
            metadata.id
        )));
    }
    if metadata.content_type != content.content_type() {
        return Err(Error::InvalidInput(format!(
            "content type '{}' does not match metadata type '{}'",
            content.content_type(),
            metadata.content_type
        )));
    }
    Ok(())
}

fn write_metadata(conn: &Connection, item: &LibraryContentMetadata) -> Result<usize> {
    let fork = item.fork.as_ref();
    let affected = conn.execute(
        "UPDATE library_content SET title = ?2, description = ?3, type = ?4, visibility = ?5,
             creator_id = ?6, tags = ?7, language = ?8, created_at = ?9, updated_at = ?10,
             sync_status = ?11, published_at = ?12, public_id = ?13, forked_from_id = ?14,
             original_author_username = ?15, original_content_public_id = ?16,
             is_pinned = ?17, pinned_order = ?18
         WHERE id = ?1",
        params![
            item.id,
            item.title,
            item.description,
            item.content_type.as_str(),
            item.visibility.as_str(),
            item.creator_id,
            tags_to_json(&item.tags)?,
            item.language,
            item.created_at.to_rfc3339(),
            item.updated_at.to_rfc3339(),
            item.sync_status.as_str(),
            item.published_at.map(|t| t.to_rfc3339()),
            item.public_id,
            fork.map(|f| f.forked_from_id.as_str()),
            fork.map(|f| f.original_author_username.as_str()),
            fork.map(|f| f.original_content_public_id.as_str()),
            item.is_pinned,
            item.pinned_order,
        ],
    )?;
    Ok(affected)
}

fn write_body(conn: &Connection, content: &Content) -> Result<()> {
    let data = serde_json::to_string(&content.body_json()?)?;
    conn.execute(
        "INSERT INTO library_content_body (content_id, type, data) VALUES (?1, ?2, ?3)
         ON CONFLICT(content_id) DO UPDATE SET type = excluded.type, data = excluded.data",
        params![content.id(), content.content_type().as_str(), data],
    )
    .map_err(map_constraint)?;
    Ok(())
}

/// Run schema creation and all migrations on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_add_pin_columns(conn)?;
    Ok(())
}

/// Migration: Add pin state columns to databases created before pinning.
///
/// Only reachable for files whose `library_content` table predates the
/// columns; `CREATE TABLE IF NOT EXISTS` leaves such tables untouched.
fn migrate_add_pin_columns(conn: &Connection) -> Result<()> {
    let columns = [
        ("is_pinned", "INTEGER NOT NULL DEFAULT 0"),
        ("pinned_order", "INTEGER"),
    ];

    for (column, decl) in columns {
        let has_column: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('library_content') WHERE name = ?1",
                [column],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !has_column {
            let sql = format!("ALTER TABLE library_content ADD COLUMN {column} {decl}");
            conn.execute(&sql, [])?;
        }
    }
    Ok(())
}

/// SQLite database connection with library and outbox operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for concurrency
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────

    /// Create a metadata row and its body in one transaction.
    pub fn create_content(
        &mut self,
        metadata: &LibraryContentMetadata,
        content: &Content,
    ) -> Result<()> {
        ensure_matches(metadata, content)?;
        let tx = self.conn.transaction()?;
        let fork = metadata.fork.as_ref();
        tx.execute(
            "INSERT INTO library_content (id, title, description, type, visibility, creator_id,
                 tags, language, created_at, updated_at, sync_status, published_at, public_id,
                 forked_from_id, original_author_username, original_content_public_id,
                 is_pinned, pinned_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                metadata.id,
                metadata.title,
                metadata.description,
                metadata.content_type.as_str(),
                metadata.visibility.as_str(),
                metadata.creator_id,
                tags_to_json(&metadata.tags)?,
                metadata.language,
                metadata.created_at.to_rfc3339(),
                metadata.updated_at.to_rfc3339(),
                metadata.sync_status.as_str(),
                metadata.published_at.map(|t| t.to_rfc3339()),
                metadata.public_id,
                fork.map(|f| f.forked_from_id.as_str()),
                fork.map(|f| f.original_author_username.as_str()),
                fork.map(|f| f.original_content_public_id.as_str()),
                metadata.is_pinned,
                metadata.pinned_order,
            ],
        )
        .map_err(map_constraint)?;
        write_body(&tx, content)?;
        tx.commit()?;
        Ok(())
    }

    /// Check if a metadata row exists.
    pub fn content_exists(&self, id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM library_content WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace every column of an existing metadata row.
    pub fn update_metadata(&mut self, item: &LibraryContentMetadata) -> Result<()> {
        let tx = self.conn.transaction()?;
        if write_metadata(&tx, item)? == 0 {
            return Err(Error::NotFound(item.id.clone()));
        }
        tx.commit()?;
        Ok(())
    }

    /// Persist an edited body together with its patched metadata row.
    pub fn save_content(
        &mut self,
        content: &Content,
        metadata: &LibraryContentMetadata,
    ) -> Result<()> {
        ensure_matches(metadata, content)?;
        let tx = self.conn.transaction()?;
        if write_metadata(&tx, metadata)? == 0 {
            return Err(Error::NotFound(metadata.id.clone()));
        }
        write_body(&tx, content)?;
        tx.commit()?;
        Ok(())
    }

    /// Get one metadata row by id.
    pub fn fetch_metadata(&self, id: &str) -> Result<LibraryContentMetadata> {
        let sql = format!("SELECT {METADATA_COLUMNS} FROM library_content WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], row_to_metadata)
            .optional()?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Get every metadata row: pinned first in pin order, then most recently updated.
    pub fn fetch_library(&self) -> Result<Vec<LibraryContentMetadata>> {
        let sql = format!(
            "SELECT {METADATA_COLUMNS} FROM library_content
             ORDER BY is_pinned DESC, pinned_order ASC, updated_at DESC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], row_to_metadata)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Read and decode the full body for a content id.
    pub fn fetch_full_content(&self, id: &str) -> Result<Content> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT type, data FROM library_content_body WHERE content_id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (type_str, data) = row.ok_or_else(|| Error::NotFound(id.to_string()))?;
        let content_type: ContentType = type_str.parse()?;
        let body: serde_json::Value = serde_json::from_str(&data)?;
        Ok(Content::from_body_json(content_type, body)?)
    }

    /// Delete a library item. Its body and queue rows cascade.
    pub fn delete_content(&mut self, id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let affected = tx.execute("DELETE FROM library_content WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    /// Highest pin order currently assigned, if any item is pinned.
    pub fn max_pinned_order(&self) -> Result<Option<i64>> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(pinned_order) FROM library_content WHERE is_pinned = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    /// Flip the pin state of one item and return the updated row.
    ///
    /// Pinning appends after the highest order currently assigned.
    pub fn toggle_pin(&mut self, id: &str) -> Result<LibraryContentMetadata> {
        let tx = self.conn.transaction()?;
        let sql = format!("SELECT {METADATA_COLUMNS} FROM library_content WHERE id = ?1");
        let mut item = tx
            .query_row(&sql, params![id], row_to_metadata)
            .optional()?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if item.is_pinned {
            item.is_pinned = false;
            item.pinned_order = None;
        } else {
            let max: Option<i64> = tx.query_row(
                "SELECT MAX(pinned_order) FROM library_content WHERE is_pinned = 1",
                [],
                |row| row.get(0),
            )?;
            item.is_pinned = true;
            item.pinned_order = Some(max.map_or(0, |m| m + 1));
        }
        write_metadata(&tx, &item)?;
        tx.commit()?;
        Ok(item)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sync queue
    // ─────────────────────────────────────────────────────────────────────

    /// Append an operation to the outbox, returning its row id.
    ///
    /// Fails with [`Error::ConstraintViolation`] if `content_id` has no
    /// metadata row.
    pub fn enqueue_operation(
        &mut self,
        content_id: &str,
        operation: OperationKind,
        visibility: Visibility,
        payload: &[u8],
    ) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO sync_queue (content_id, operation, visibility, payload, retry_count, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                content_id,
                operation.as_str(),
                visibility.as_str(),
                payload,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(map_constraint)?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Rows still eligible for delivery, oldest first.
    pub fn get_pending_operations(&self, max_retries: u32) -> Result<Vec<SyncQueueOperation>> {
        let sql =
            format!("SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE retry_count < ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let ops = stmt
            .query_map(params![max_retries], row_to_operation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ops)
    }

    /// Rows that exhausted their automatic attempts, oldest first.
    pub fn get_failed_operations(&self, max_retries: u32) -> Result<Vec<SyncQueueOperation>> {
        let sql =
            format!("SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE retry_count >= ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let ops = stmt
            .query_map(params![max_retries], row_to_operation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ops)
    }

    /// Record a failed attempt and return the new retry count.
    pub fn increment_retry_count(&mut self, op_id: i64, error_message: &str) -> Result<u32> {
        let tx = self.conn.transaction()?;
        let affected = tx.execute(
            "UPDATE sync_queue SET retry_count = retry_count + 1, last_error = ?2 WHERE id = ?1",
            params![op_id, error_message],
        )?;
        if affected == 0 {
            return Err(Error::NotFound(format!("sync operation {op_id}")));
        }
        let count: u32 = tx.query_row(
            "SELECT retry_count FROM sync_queue WHERE id = ?1",
            params![op_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(count)
    }

    /// Remove a delivered operation. Returns false if the row was already gone.
    pub fn mark_operation_complete(&mut self, op_id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let affected = tx.execute("DELETE FROM sync_queue WHERE id = ?1", params![op_id])?;
        tx.commit()?;
        Ok(affected > 0)
    }

    /// Apply a delivered operation's metadata transition and remove the row atomically.
    pub fn complete_operation(
        &mut self,
        op_id: i64,
        metadata: &LibraryContentMetadata,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        if write_metadata(&tx, metadata)? == 0 {
            return Err(Error::NotFound(metadata.id.clone()));
        }
        tx.execute("DELETE FROM sync_queue WHERE id = ?1", params![op_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Make failed rows eligible again. Returns the number of rows reset.
    pub fn reset_failed_operations(&mut self, max_retries: u32) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let affected = tx.execute(
            "UPDATE sync_queue SET retry_count = 0 WHERE retry_count >= ?1",
            params![max_retries],
        )?;
        tx.commit()?;
        Ok(affected)
    }

    /// Count rows by retry state.
    pub fn get_queue_counts(&self, max_retries: u32) -> Result<QueueCounts> {
        let (pending, failed): (i64, i64) = self.conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN retry_count < ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN retry_count >= ?1 THEN 1 ELSE 0 END), 0)
             FROM sync_queue",
            params![max_retries],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(QueueCounts {
            pending: usize::try_from(pending).unwrap_or(0),
            failed: usize::try_from(failed).unwrap_or(0),
        })
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
