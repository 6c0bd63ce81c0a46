// ABOUTME: Block extractor that pages through a SQLite table with a single cursor
// ABOUTME: Yields typed record blocks lazily; the cursor is released on every exit path

use crate::config::BatchOptions;
use crate::error::MigrationError;
use crate::records::Record;
use crate::utils::quote_ident;
use anyhow::Result;
use rusqlite::{Connection, Rows, Statement};
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Reads the table named by `R::DESCRIPTOR` in blocks of typed records
pub struct SqliteExtractor<'conn, R> {
    stmt: Statement<'conn>,
    options: BatchOptions,
    _record: PhantomData<fn() -> R>,
}

impl<'conn, R: Record> SqliteExtractor<'conn, R> {
    /// Prepare `SELECT *` against the table
    ///
    /// Fails when the table does not exist, or when its column count differs
    /// from the record's, before any row is read.
    pub fn new(conn: &'conn Connection, options: BatchOptions) -> Result<Self> {
        options.validate()?;
        let descriptor = R::DESCRIPTOR;
        let table = descriptor.name;

        let stmt = conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(table)))
            .map_err(|source| {
                tracing::error!("Failed to query source table '{}': {}", table, source);
                MigrationError::SourceRead {
                    table: table.to_string(),
                    source,
                }
            })?;

        let actual = stmt.column_count();
        if actual != descriptor.column_count() {
            tracing::error!(
                "Source table '{}' has {} column(s), expected {}",
                table,
                actual,
                descriptor.column_count()
            );
            return Err(MigrationError::RecordShape {
                table: table.to_string(),
                expected: descriptor.column_count(),
                actual,
            }
            .into());
        }

        Ok(Self {
            stmt,
            options,
            _record: PhantomData,
        })
    }

    /// Run the query and page through it lazily
    pub fn blocks(&mut self) -> Result<Blocks<'_, R>> {
        let table = R::DESCRIPTOR.name;
        let rows = self.stmt.query([]).map_err(|source| {
            tracing::error!("Failed to query source table '{}': {}", table, source);
            MigrationError::SourceRead {
                table: table.to_string(),
                source,
            }
        })?;

        Ok(Blocks {
            rows,
            options: self.options,
            emitted: 0,
            rows_read: 0,
            finished: false,
            _record: PhantomData,
        })
    }
}

/// Lazy, finite sequence of record blocks over one open cursor
///
/// Ends after the first empty fetch or the first error. Dropping it resets the
/// underlying statement.
pub struct Blocks<'stmt, R> {
    rows: Rows<'stmt>,
    options: BatchOptions,
    emitted: usize,
    rows_read: usize,
    finished: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Blocks<'_, R> {
    fn fetch_block(&mut self) -> Result<Vec<R>> {
        let table = R::DESCRIPTOR.name;
        let mut block = Vec::with_capacity(self.options.block_size);

        while block.len() < self.options.block_size {
            let row = match self.rows.next() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(source) => {
                    return Err(MigrationError::SourceRead {
                        table: table.to_string(),
                        source,
                    }
                    .into())
                }
            };

            let record = R::from_row(row).map_err(|source| MigrationError::RecordConversion {
                table: table.to_string(),
                row: self.rows_read + 1,
                source,
            })?;
            self.rows_read += 1;
            block.push(record);
        }

        Ok(block)
    }
}

impl<R: Record> Iterator for Blocks<'_, R> {
    type Item = Result<Vec<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.fetch_block() {
            Ok(block) if block.is_empty() => {
                self.finished = true;
                if self.options.verbose {
                    tracing::info!(
                        "Extracted {} block(s) from {}",
                        self.emitted,
                        R::DESCRIPTOR.name
                    );
                }
                None
            }
            Ok(block) => {
                self.emitted += 1;
                Some(Ok(block))
            }
            Err(e) => {
                self.finished = true;
                tracing::error!("Failed to load data from '{}': {:#}", R::DESCRIPTOR.name, e);
                Some(Err(e))
            }
        }
    }
}

impl<R: Record> FusedIterator for Blocks<'_, R> {}
