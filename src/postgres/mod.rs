// ABOUTME: PostgreSQL target utilities module
// ABOUTME: Exports connection management, COPY encoding, and the block loader

pub mod connection;
pub mod copy;
pub mod loader;

pub use connection::{connect, connect_with_config};
pub use copy::{copy_statement, encode_block, BulkCopy, NULL_SENTINEL};
pub use loader::{LoadSummary, PostgresLoader};

use crate::utils::quote_ident;
use anyhow::{Context, Result};
use tokio_postgres::Client;

/// Count rows in a table on the current `search_path`
pub async fn count_rows(client: &Client, table: &str) -> Result<i64> {
    let row = client
        .query_one(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)), &[])
        .await
        .with_context(|| format!("Failed to count rows in target table '{}'", table))?;

    Ok(row.get(0))
}
