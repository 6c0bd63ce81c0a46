// ABOUTME: Verify command implementation - compare row counts after a load
// ABOUTME: Counts every catalogue table in SQLite and PostgreSQL and reports mismatches

use super::migrate::MIGRATION_ORDER;
use crate::{postgres, sqlite};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio_postgres::Client;

/// Row counts for one table on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: &'static str,
    pub source_rows: i64,
    pub target_rows: i64,
}

impl TableCount {
    /// Returns true if both sides hold the same number of rows
    pub fn is_match(&self) -> bool {
        self.source_rows == self.target_rows
    }
}

/// Compare row counts between source and target for every migrated table
///
/// Tables are checked sequentially, in migration order, with a progress bar.
///
/// # Errors
///
/// This function will return an error if:
/// - A count query fails on either side
/// - Any table's counts differ
pub async fn verify_row_counts(source: &Connection, target: &Client) -> Result<Vec<TableCount>> {
    tracing::info!("Verifying row counts...");

    let progress = ProgressBar::new(MIGRATION_ORDER.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut counts = Vec::with_capacity(MIGRATION_ORDER.len());
    for descriptor in MIGRATION_ORDER {
        let source_rows = sqlite::count_rows(source, descriptor.name)?;
        let target_rows = postgres::count_rows(target, descriptor.name).await?;
        counts.push(TableCount {
            table: descriptor.name,
            source_rows,
            target_rows,
        });
        progress.inc(1);
        progress.set_message(format!("Verified {}", descriptor.name));
    }
    progress.finish_with_message("Verification complete");

    let mismatches = report(&counts);
    if mismatches > 0 {
        anyhow::bail!("{} table(s) failed verification", mismatches);
    }

    Ok(counts)
}

fn report(counts: &[TableCount]) -> usize {
    let mut mismatches = 0;
    for count in counts {
        if count.is_match() {
            tracing::info!("  ✓ {}: {} rows", count.table, count.source_rows);
        } else {
            tracing::error!(
                "  ✗ {}: MISMATCH: source={}, target={}",
                count.table,
                count.source_rows,
                count.target_rows
            );
            mismatches += 1;
        }
    }

    tracing::info!(
        "Verification summary: {} match, {} mismatch",
        counts.len() - mismatches,
        mismatches
    );
    mismatches
}
