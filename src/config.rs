// ABOUTME: Run configuration for the SQLite to PostgreSQL load
// ABOUTME: Built once in main from CLI flags and environment, then passed down explicitly

use crate::error::MigrationError;
use crate::utils::validate_identifier;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// Rows fetched from the source per round-trip when nothing else is configured
pub const DEFAULT_BLOCK_SIZE: usize = 100;

/// Schema the target tables live in
pub const DEFAULT_SEARCH_PATH: &str = "content";

/// Location of the source database file
pub const DEFAULT_SQLITE_PATH: &str = "db.sqlite";

/// Paging and logging knobs shared by the extractor and the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of records per block
    pub block_size: usize,
    /// Rows per COPY data frame sent to the server
    pub page_size: usize,
    /// Log a block count per table when it finishes
    pub verbose: bool,
}

impl BatchOptions {
    pub fn new(block_size: usize, verbose: bool) -> Self {
        Self {
            block_size,
            page_size: block_size,
            verbose,
        }
    }

    /// Reject sizes that would make every table look empty
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(invalid("block size must be greater than zero"));
        }
        if self.page_size == 0 {
            return Err(invalid("page size must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE, true)
    }
}

/// Connection settings for the PostgreSQL target
#[derive(Clone)]
pub struct TargetConfig {
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Schema placed on the session `search_path`
    pub search_path: String,
}

impl TargetConfig {
    /// Session options sent in the startup packet
    pub fn options(&self) -> String {
        format!("-c search_path={}", self.search_path)
    }

    /// Build the tokio-postgres connection config
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .dbname(&self.dbname)
            .user(&self.user)
            .password(&self.password)
            .host(&self.host)
            .port(self.port)
            .options(&self.options())
            .application_name("sqlite-pg-loader");
        config
    }
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("search_path", &self.search_path)
            .finish()
    }
}

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub sqlite_path: PathBuf,
    pub target: TargetConfig,
    pub batch: BatchOptions,
    /// Compare row counts between source and target after loading
    pub verify: bool,
}

impl MigrationConfig {
    /// Reject settings that would fail later in a less obvious way
    pub fn validate(&self) -> Result<()> {
        self.batch.validate()?;
        if self.sqlite_path.as_os_str().is_empty() {
            return Err(invalid("SQLite path cannot be empty"));
        }

        let target = &self.target;
        for (label, value) in [
            ("database name", &target.dbname),
            ("user", &target.user),
            ("host", &target.host),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(&format!("target {} cannot be empty", label)));
            }
        }
        if target.port == 0 {
            return Err(invalid("target port cannot be 0"));
        }

        validate_identifier(&target.search_path)
            .map_err(|e| invalid(&format!("search path: {}", e)))?;

        Ok(())
    }
}

fn invalid(message: &str) -> anyhow::Error {
    MigrationError::InvalidConfig(message.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> MigrationConfig {
        MigrationConfig {
            sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
            target: TargetConfig {
                dbname: "movies_database".to_string(),
                user: "app".to_string(),
                password: "s3cret".to_string(),
                host: "127.0.0.1".to_string(),
                port: 5432,
                search_path: DEFAULT_SEARCH_PATH.to_string(),
            },
            batch: BatchOptions::default(),
            verify: false,
        }
    }

    #[test]
    fn test_default_batch_options() {
        let options = BatchOptions::default();
        assert_eq!(options.block_size, 100);
        assert_eq!(options.page_size, 100);
        assert!(options.verbose);
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let mut config = sample_config();
        config.batch = BatchOptions::new(0, true);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MigrationError>(),
            Some(MigrationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let options = BatchOptions {
            block_size: 100,
            page_size: 0,
            verbose: false,
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("page size"));
        assert!(BatchOptions::new(1, false).validate().is_ok());
    }

    #[test]
    fn test_search_path_must_be_identifier() {
        let mut config = sample_config();
        config.target.search_path = "content, public".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = sample_config();
        config.target.host = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_options_sets_search_path() {
        assert_eq!(sample_config().target.options(), "-c search_path=content");
    }

    #[test]
    fn test_pg_config_carries_settings() {
        let pg = sample_config().target.to_pg_config();
        assert_eq!(pg.get_dbname(), Some("movies_database"));
        assert_eq!(pg.get_user(), Some("app"));
        assert_eq!(pg.get_ports(), &[5432]);
        assert_eq!(pg.get_options(), Some("-c search_path=content"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", sample_config());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
