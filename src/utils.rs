// ABOUTME: Utility functions for identifier handling
// ABOUTME: Provides identifier validation, quoting, and display sanitizing

use anyhow::{bail, Result};

/// PostgreSQL truncates identifiers longer than this
const MAX_IDENTIFIER_LEN: usize = 63;

/// Validate a plain (unquoted) SQL identifier such as a schema name
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit,
/// up to 63 characters.
///
/// # Examples
///
/// ```
/// # use sqlite_pg_loader::utils::validate_identifier;
/// assert!(validate_identifier("content").is_ok());
/// assert!(validate_identifier("content; DROP TABLE genre").is_err());
/// assert!(validate_identifier("1st").is_err());
/// ```
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        bail!("Identifier cannot be empty");
    }

    if identifier.len() > MAX_IDENTIFIER_LEN {
        bail!(
            "Identifier '{}' is longer than {} characters",
            sanitize_identifier(identifier),
            MAX_IDENTIFIER_LEN
        );
    }

    let mut chars = identifier.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!(
            "Invalid identifier '{}': only letters, digits and underscores are allowed",
            sanitize_identifier(identifier)
        );
    }

    Ok(())
}

/// Quote an identifier for use in SQL text
///
/// Works for both SQLite and PostgreSQL.
///
/// ```
/// # use sqlite_pg_loader::utils::quote_ident;
/// assert_eq!(quote_ident("type"), "\"type\"");
/// assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_ident(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Sanitize an identifier (table name, schema name, etc.) for display
///
/// Removes control characters and limits length to prevent log injection.
/// This is for display purposes only.
///
/// ```
/// # use sqlite_pg_loader::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("normal_table"), "normal_table");
/// assert_eq!(sanitize_identifier("table\nname"), "tablename");
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}
