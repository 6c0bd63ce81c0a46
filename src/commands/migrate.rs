// ABOUTME: Migrate command - copies the catalogue tables from SQLite into PostgreSQL
// ABOUTME: Runs one extractor and one loader per table, in dependency order, stopping at the first failure

use crate::config::{BatchOptions, MigrationConfig};
use crate::error::MigrationError;
use crate::postgres::{self, BulkCopy, PostgresLoader};
use crate::records::{
    is_dependency_ordered, Genre, GenreFilmWork, Movie, Person, PersonFilmWork, Record,
    TableDescriptor,
};
use crate::sqlite::{self, SqliteExtractor};
use anyhow::{Context, Result};
use rusqlite::Connection;

/// What was copied for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: &'static str,
    pub blocks: usize,
    pub rows: u64,
}

/// What was copied in one run, in migration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub tables: Vec<TableReport>,
}

impl MigrationReport {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

macro_rules! migration_plan {
    ($($record:ty),+ $(,)?) => {
        /// Tables in the order they are copied; parents come before link tables
        pub const MIGRATION_ORDER: &[TableDescriptor] = &[$(<$record as Record>::DESCRIPTOR),+];

        async fn run_plan<T: BulkCopy>(
            source: &Connection,
            target: &mut T,
            options: BatchOptions,
        ) -> Result<MigrationReport> {
            let mut report = MigrationReport::default();
            $(
                report
                    .tables
                    .push(migrate_table::<$record, T>(source, target, options).await?);
            )+
            Ok(report)
        }
    };
}

migration_plan!(Movie, Genre, Person, GenreFilmWork, PersonFilmWork);

const _: () = assert!(
    is_dependency_ordered(MIGRATION_ORDER),
    "MIGRATION_ORDER must list every table after the tables it depends on"
);

/// Copy the whole catalogue from an open SQLite connection into `target`
///
/// Checks that every table exists in the source before copying anything.
/// Afterwards tables are copied one at a time; the first failure is returned
/// and tables copied before it are left in place.
pub async fn load_from_sqlite<T: BulkCopy>(
    source: &Connection,
    target: &mut T,
    options: BatchOptions,
) -> Result<MigrationReport> {
    options.validate()?;
    check_source_tables(source)?;
    run_plan(source, target, options).await
}

/// Fail before any copy when a table from the plan is missing in the source
pub fn check_source_tables(source: &Connection) -> Result<()> {
    for descriptor in MIGRATION_ORDER {
        if !sqlite::table_exists(source, descriptor.name)? {
            tracing::error!("Source table '{}' does not exist", descriptor.name);
            return Err(MigrationError::MissingSourceTable(descriptor.name.to_string()).into());
        }
    }
    Ok(())
}

async fn migrate_table<R: Record, T: BulkCopy>(
    source: &Connection,
    target: &mut T,
    options: BatchOptions,
) -> Result<TableReport> {
    let table = R::DESCRIPTOR.name;
    tracing::info!("Migrating table '{}'...", table);

    let mut extractor = SqliteExtractor::<R>::new(source, options)?;
    let blocks = extractor.blocks()?;

    let summary = PostgresLoader::<T, R>::new(target, options)
        .save_all(blocks)
        .await?;

    tracing::info!("✓ {}: {} row(s) copied", table, summary.rows);

    Ok(TableReport {
        table,
        blocks: summary.blocks,
        rows: summary.rows,
    })
}

/// Run a full migration described by `config`
///
/// Opens the SQLite file and the PostgreSQL connection for the duration of the
/// run; both are closed when this returns, whatever the outcome.
///
/// # Examples
///
/// ```no_run
/// # use anyhow::Result;
/// # use sqlite_pg_loader::commands::migrate;
/// # use sqlite_pg_loader::config::MigrationConfig;
/// # async fn example(config: MigrationConfig) -> Result<()> {
/// let report = migrate(&config).await?;
/// println!("Copied {} rows", report.total_rows());
/// # Ok(())
/// # }
/// ```
pub async fn migrate(config: &MigrationConfig) -> Result<MigrationReport> {
    config.validate()?;

    tracing::info!("Starting migration...");
    tracing::info!("Opening source '{}'...", config.sqlite_path.display());
    let source = sqlite::open_read_only(&config.sqlite_path)?;

    tracing::info!(
        "Connecting to target {}:{}/{}...",
        config.target.host,
        config.target.port,
        config.target.dbname
    );
    let mut target = postgres::connect(&config.target)
        .await
        .context("Failed to connect to target database")?;
    tracing::info!("✓ Connected to target");

    let report = load_from_sqlite(&source, &mut target, config.batch).await?;

    tracing::info!(
        "✅ Migration complete: {} table(s), {} row(s)",
        report.tables.len(),
        report.total_rows()
    );

    if config.verify {
        crate::commands::verify_row_counts(&source, &target).await?;
    }

    Ok(report)
}
