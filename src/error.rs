// ABOUTME: Error categories for the SQLite to PostgreSQL load
// ABOUTME: Wrapped in anyhow so callers can downcast when they need the category

use thiserror::Error;

/// Failure categories surfaced by the extract/load pipeline.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Query or fetch against the SQLite source failed
    #[error("Failed to read from source table '{table}': {source}")]
    SourceRead {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Source row has a different number of columns than the record expects
    #[error("Table '{table}' has {actual} column(s) but its record expects {expected}")]
    RecordShape {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// A column value could not be read as the record field's type
    #[error("Failed to build record for row {row} of '{table}': {source}")]
    RecordConversion {
        table: String,
        row: usize,
        #[source]
        source: rusqlite::Error,
    },

    /// COPY into the target table failed
    #[error("Bulk copy into '{table}' failed: {message}")]
    TargetWrite { table: String, message: String },

    /// A table from the migration plan does not exist in the source file
    #[error("Source table '{0}' does not exist")]
    MissingSourceTable(String),

    /// Configuration rejected before any connection was opened
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MigrationError {
    pub fn target_write(table: &str, message: impl Into<String>) -> Self {
        Self::TargetWrite {
            table: table.to_string(),
            message: message.into(),
        }
    }
}
