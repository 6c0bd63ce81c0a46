// ABOUTME: CLI entry point for sqlite-pg-loader
// ABOUTME: Builds the run configuration from flags and environment, then runs the migration

use clap::Parser;
use sqlite_pg_loader::commands;
use sqlite_pg_loader::config::{
    BatchOptions, MigrationConfig, TargetConfig, DEFAULT_BLOCK_SIZE, DEFAULT_SEARCH_PATH,
    DEFAULT_SQLITE_PATH,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sqlite-pg-loader")]
#[command(
    about = "Copy the movie catalogue from SQLite into PostgreSQL",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Target database name
    #[arg(long, env = "DB_NAME")]
    db_name: String,
    /// Target database user
    #[arg(long, env = "POSTGRES_USER")]
    db_user: String,
    /// Target database password
    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    db_password: String,
    /// Target database host
    #[arg(long, env = "DB_DEV_HOST")]
    db_host: String,
    /// Target database port
    #[arg(long, env = "DB_PORT")]
    db_port: u16,
    /// Schema the target tables live in
    #[arg(long, env = "DB_SEARCH_PATH", default_value = DEFAULT_SEARCH_PATH)]
    search_path: String,
    /// Path to the source SQLite database
    #[arg(long, env = "SQLITE_PATH", default_value = DEFAULT_SQLITE_PATH)]
    sqlite_path: PathBuf,
    /// Rows fetched and inserted per block
    #[arg(long, env = "BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,
    /// Do not log per-table block counts
    #[arg(long)]
    quiet: bool,
    /// Compare row counts between source and target after loading
    #[arg(long)]
    verify: bool,
}

impl Cli {
    fn into_config(self) -> MigrationConfig {
        MigrationConfig {
            sqlite_path: self.sqlite_path,
            target: TargetConfig {
                dbname: self.db_name,
                user: self.db_user,
                password: self.db_password,
                host: self.db_host,
                port: self.db_port,
                search_path: self.search_path,
            },
            batch: BatchOptions::new(self.block_size, !self.quiet),
            verify: self.verify,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();

    // Both connections are closed by the time `migrate` returns
    if let Err(e) = commands::migrate(&config).await {
        tracing::error!("Migration failed: {:#}", e);
        println!("Migration failed: {}", e);
    }
}
