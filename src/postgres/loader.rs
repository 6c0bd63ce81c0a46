// ABOUTME: Block loader that bulk-copies record blocks into a PostgreSQL table
// ABOUTME: One COPY per block, no upserts, stops at the first failure

use super::copy::{copy_statement, encode_block, BulkCopy};
use crate::config::BatchOptions;
use crate::error::MigrationError;
use crate::records::Record;
use anyhow::Result;
use std::marker::PhantomData;

/// Counts reported after a table has been loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub blocks: usize,
    pub rows: u64,
}

/// Writes blocks of `R` into the table named by `R::DESCRIPTOR`
///
/// The target table is assumed empty. Duplicate keys, type mismatches and
/// missing referenced rows all fail the COPY and abort the load.
pub struct PostgresLoader<'t, T, R> {
    target: &'t mut T,
    options: BatchOptions,
    statement: String,
    _record: PhantomData<fn(R)>,
}

impl<'t, T: BulkCopy, R: Record> PostgresLoader<'t, T, R> {
    pub fn new(target: &'t mut T, options: BatchOptions) -> Self {
        Self {
            target,
            options,
            statement: copy_statement(&R::DESCRIPTOR),
            _record: PhantomData,
        }
    }

    /// Consume every block and copy it into the target table
    ///
    /// An `Err` coming out of the block sequence stops the load and is
    /// returned as-is; blocks copied before it stay in the table.
    pub async fn save_all<I>(&mut self, blocks: I) -> Result<LoadSummary>
    where
        I: IntoIterator<Item = Result<Vec<R>>>,
    {
        let table = R::DESCRIPTOR.name;
        let mut summary = LoadSummary::default();

        for block in blocks {
            let block = block?;
            if block.is_empty() {
                continue;
            }

            let frames = encode_block(&block, self.options.page_size);
            let rows = match self.target.copy_block(&self.statement, frames).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!("Failed to insert block into '{}': {:#}", table, e);
                    return Err(MigrationError::target_write(table, format!("{:#}", e)).into());
                }
            };

            summary.blocks += 1;
            summary.rows += rows;
            tracing::debug!(
                "Copied block {} ({} rows) into '{}'",
                summary.blocks,
                rows,
                table
            );
        }

        if self.options.verbose {
            tracing::info!("Inserted {} block(s) into {}", summary.blocks, table);
        }

        Ok(summary)
    }
}
