// ABOUTME: PostgreSQL connection utilities for the load target
// ABOUTME: Handles TLS setup, readable connect errors, and the connection task

use crate::config::TargetConfig;
use anyhow::{Context, Result};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Client;

/// Connect to the target described by the run configuration
///
/// The session `search_path` is set through the startup options, so every
/// unqualified table name resolves into the configured schema.
pub async fn connect(target: &TargetConfig) -> Result<Client> {
    tracing::debug!(
        "Connecting to {}:{}/{} as {}",
        target.host,
        target.port,
        target.dbname,
        target.user
    );
    connect_with_config(&target.to_pg_config())
        .await
        .context("Check DB_NAME, POSTGRES_USER, POSTGRES_PASSWORD, DB_DEV_HOST and DB_PORT")
}

/// Connect with an already-built tokio-postgres config
///
/// TLS is negotiated using the config's `sslmode` (tokio-postgres defaults to
/// `prefer`).
pub async fn connect_with_config(config: &tokio_postgres::Config) -> Result<Client> {
    let tls_connector = TlsConnector::builder()
        .danger_accept_invalid_certs(false)
        .build()
        .context("Failed to build TLS connector")?;
    let tls = MakeTlsConnector::new(tls_connector);

    let (client, connection) = config
        .connect(tls)
        .await
        .map_err(|e| describe_connect_error(&e.to_string()))?;

    // Spawn connection handler
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    Ok(client)
}

fn describe_connect_error(error_msg: &str) -> anyhow::Error {
    if error_msg.contains("password authentication failed") {
        anyhow::anyhow!(
            "Authentication failed: Invalid username or password.\n\
             Please verify your database credentials."
        )
    } else if error_msg.contains("database") && error_msg.contains("does not exist") {
        anyhow::anyhow!(
            "Database does not exist: {}\n\
             Please create the database first or check the database name.",
            error_msg
        )
    } else if error_msg.contains("Connection refused") || error_msg.contains("could not connect")
    {
        anyhow::anyhow!(
            "Connection refused: Unable to reach database server.\n\
             Please check:\n\
             - The host and port are correct\n\
             - The database server is running\n\
             - Firewall rules allow connections\n\
             Error: {}",
            error_msg
        )
    } else if error_msg.contains("SSL") || error_msg.contains("TLS") {
        anyhow::anyhow!(
            "TLS/SSL error: Failed to establish secure connection.\n\
             Error: {}",
            error_msg
        )
    } else {
        anyhow::anyhow!("Failed to connect to database: {}", error_msg)
    }
}
