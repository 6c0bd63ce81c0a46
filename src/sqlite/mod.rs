// ABOUTME: SQLite source utilities for reading the catalogue file
// ABOUTME: Read-only open, table discovery, and the block extractor

pub mod extractor;

pub use extractor::{Blocks, SqliteExtractor};

use crate::utils::quote_ident;
use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// Open the source database file without write access
///
/// A missing file is an error; SQLite would otherwise create an empty
/// database and every table would look missing.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        bail!(
            "SQLite database '{}' does not exist or is not a file",
            path.display()
        );
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open SQLite database '{}'", path.display()))?;

    tracing::debug!("Opened SQLite database '{}' read-only", path.display());

    Ok(conn)
}

/// Check whether a table exists in the source
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |_| Ok(()),
        )
        .optional()
        .with_context(|| format!("Failed to look up table '{}' in SQLite", table))?;

    Ok(found.is_some())
}

/// Count rows in a source table
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
        [],
        |row| row.get(0),
    )
    .with_context(|| format!("Failed to count rows in source table '{}'", table))
}
