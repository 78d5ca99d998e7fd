//! SQLite-based resource sink
//!
//! This module provides a sink that writes one row per visited resource and
//! one row per finished crawl to a SQLite database.

use crate::output::traits::{CrawlSummary, OutputError, OutputResult, ResourceRecord, ResourceSink};
use crate::state::ResourceStatus;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQL schema for the results database
pub const SCHEMA_SQL: &str = r#"
-- One row per visited resource
CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    normalized_url TEXT NOT NULL,
    final_url TEXT,
    depth INTEGER NOT NULL,
    domain TEXT NOT NULL,
    is_external INTEGER NOT NULL,
    status_code INTEGER,
    status TEXT NOT NULL,
    resource_type TEXT NOT NULL,
    byte_length INTEGER NOT NULL,
    mime_type TEXT,
    fetch_duration_ms INTEGER NOT NULL,
    content_hash TEXT,
    is_duplicate INTEGER NOT NULL,
    canonical_url TEXT,
    parent_url TEXT,
    link_source TEXT,
    error_kind TEXT,
    error_message TEXT,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resources_normalized_url ON resources(normalized_url);
CREATE INDEX IF NOT EXISTS idx_resources_status ON resources(status);
CREATE INDEX IF NOT EXISTS idx_resources_content_hash ON resources(content_hash);

-- One row per finished crawl
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_url TEXT NOT NULL,
    mode TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    duration_ms INTEGER NOT NULL,
    termination TEXT NOT NULL,
    config_hash TEXT,
    records_emitted INTEGER NOT NULL,
    succeeded INTEGER NOT NULL,
    failed INTEGER NOT NULL,
    duplicates INTEGER NOT NULL,
    bytes_downloaded INTEGER NOT NULL
);
"#;

/// SQLite-backed resource sink
///
/// The connection sits behind a mutex so the sink can be shared by all workers.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Opens (or creates) a database file and applies the schema
    pub fn open(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory database (for testing)
    pub fn in_memory() -> OutputResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> OutputResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| OutputError::Storage(format!("Failed to lock database: {}", e)))
    }

    /// Stores the summary of a finished crawl, returning its row id
    pub fn record_summary(&self, summary: &CrawlSummary) -> OutputResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO crawl_runs (start_url, mode, started_at, finished_at, duration_ms,
                termination, config_hash, records_emitted, succeeded, failed, duplicates,
                bytes_downloaded)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                summary.normalized_start_url,
                summary.mode.as_str(),
                summary.started_at.to_rfc3339(),
                summary.finished_at.to_rfc3339(),
                summary.duration.as_millis() as i64,
                summary.termination.as_str(),
                summary.config_hash,
                summary.records_emitted as i64,
                summary.succeeded as i64,
                summary.failed as i64,
                summary.duplicates as i64,
                summary.bytes_downloaded as i64,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Number of stored resource rows
    pub fn count(&self) -> OutputResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of stored resource rows with the given status
    pub fn count_by_status(&self, status: ResourceStatus) -> OutputResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM resources WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Normalized URLs of all stored resources, in insertion order
    pub fn normalized_urls(&self) -> OutputResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT normalized_url FROM resources ORDER BY id")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }
}

impl ResourceSink for SqliteSink {
    fn record(&self, record: &ResourceRecord) -> OutputResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO resources (url, normalized_url, final_url, depth, domain, is_external,
                status_code, status, resource_type, byte_length, mime_type, fetch_duration_ms,
                content_hash, is_duplicate, canonical_url, parent_url, link_source, error_kind,
                error_message, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20)",
            params![
                record.url,
                record.normalized_url,
                record.final_url,
                record.depth,
                record.domain,
                record.is_external,
                record.status_code,
                record.status.to_db_string(),
                record.resource_type.as_str(),
                record.byte_length as i64,
                record.mime_type,
                record.fetch_duration.as_millis() as i64,
                record.content_hash,
                record.is_duplicate,
                record.canonical_url,
                record.parent_url,
                record.link_source.map(|s| s.as_str()),
                record.error.as_ref().map(|e| e.kind.as_str()),
                record.error.as_ref().map(|e| e.message.as_str()),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
