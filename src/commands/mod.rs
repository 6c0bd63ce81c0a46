// ABOUTME: Command implementations for the SQLite to PostgreSQL load
// ABOUTME: Exports the migrate driver and the post-load row count check

pub mod migrate;
pub mod verify;

pub use migrate::{
    check_source_tables, load_from_sqlite, migrate, MigrationReport, TableReport, MIGRATION_ORDER,
};
pub use verify::{verify_row_counts, TableCount};
