//! PostgreSQL client
//!
//! A single connection is enough for one export run, so the client owns one
//! `tokio_postgres::Client` and the task driving its connection.

use crate::config::DatabaseConfig;
use crate::domain::{BpaError, Result};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// Connected PostgreSQL client
pub struct PostgresClient {
    client: tokio_postgres::Client,
    connection: JoinHandle<()>,
}

impl PostgresClient {
    /// Connects with the configured credentials
    ///
    /// # Errors
    ///
    /// Returns [`BpaError::DataSource`] if the server cannot be reached or
    /// rejects the credentials.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(config.host.as_str())
            .port(config.port)
            .dbname(config.dbname.as_str())
            .user(config.user.as_str())
            .application_name("bpa-export")
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds));
        if let Some(password) = &config.password {
            let password: &str = password.expose_secret().as_ref();
            pg_config.password(password);
        }

        let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
            BpaError::DataSource(format!(
                "Failed to connect to PostgreSQL at {}:{}/{}: {}",
                config.host, config.port, config.dbname, e
            ))
        })?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        tracing::debug!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            "Connected to PostgreSQL"
        );
        Ok(Self { client, connection })
    }

    /// Executes `SELECT 1`
    pub async fn test_connection(&self) -> Result<()> {
        self.client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| BpaError::DataSource(format!("Connection test failed: {e}")))?;
        tracing::info!("PostgreSQL connection test successful");
        Ok(())
    }

    /// Runs statements without parameters (session settings)
    pub async fn batch_execute(&self, statements: &str) -> Result<()> {
        self.client
            .batch_execute(statements)
            .await
            .map_err(|e| BpaError::DataSource(format!("Statement execution failed: {e}")))
    }

    /// Executes a query and returns its rows
    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        self.client
            .query(query, params)
            .await
            .map_err(|e| BpaError::DataSource(format!("Query failed: {e}")))
    }
}

impl Drop for PostgresClient {
    fn drop(&mut self) {
        self.connection.abort();
    }
}
