//! SQLite pool construction.
//!
//! Every pool runs WAL with foreign keys on and a generous busy timeout;
//! the engagement repositories lean on short transactions, so writer
//! contention resolves through the timeout rather than failing fast.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::domain::models::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
    #[error("Failed to create database directory: {0}")]
    DirectoryCreationFailed(#[source] std::io::Error),
    #[error("Failed to open pool: {0}")]
    PoolOpenFailed(#[source] sqlx::Error),
}

/// Pool sizing, taken from the database section of the config.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
        }
    }
}

impl From<&DatabaseConfig> for PoolSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            ..Self::default()
        }
    }
}

/// Open a pool against a file-backed database, creating the file and its
/// parent directory on first use.
pub async fn create_pool(
    database_url: &str,
    settings: PoolSettings,
) -> Result<SqlitePool, ConnectionError> {
    let options = connect_options(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(30));
    ensure_parent_directory(database_url)?;

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(1)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(ConnectionError::PoolOpenFailed)
}

/// Open a single-connection in-memory pool. One connection keeps every
/// query on the same private memory database.
pub async fn create_test_pool() -> Result<SqlitePool, ConnectionError> {
    let options = connect_options("sqlite::memory:")?.shared_cache(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(ConnectionError::PoolOpenFailed)
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, ConnectionError> {
    // sqlx's parser treats a foreign-scheme URL as a literal file name
    // rather than rejecting it, so the scheme is checked here.
    if database_url.contains("://") && !database_url.starts_with("sqlite:") {
        return Err(ConnectionError::InvalidDatabaseUrl(database_url.to_string()));
    }

    Ok(SqliteConnectOptions::from_str(database_url)
        .map_err(|_| ConnectionError::InvalidDatabaseUrl(database_url.to_string()))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true))
}

fn ensure_parent_directory(database_url: &str) -> Result<(), ConnectionError> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }

    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(ConnectionError::DirectoryCreationFailed)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_follow_the_config() {
        let config = DatabaseConfig {
            path: ".agora/agora.db".to_string(),
            max_connections: 12,
        };
        let settings = PoolSettings::from(&config);
        assert_eq!(settings.max_connections, 12);
    }

    #[tokio::test]
    async fn test_memory_pool_opens_and_answers() {
        let pool = create_test_pool().await.expect("pool");
        let row: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query");
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_rejects_a_foreign_scheme() {
        let err = create_pool("postgres://elsewhere/agora", PoolSettings::default())
            .await
            .expect_err("must fail");
        assert!(matches!(err, ConnectionError::InvalidDatabaseUrl(_)));
    }

    #[tokio::test]
    async fn test_file_pool_creates_the_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("agora.db");
        let url = format!("sqlite://{}", path.display());

        let pool = create_pool(&url, PoolSettings::default())
            .await
            .expect("pool");
        sqlx::query("SELECT 1").execute(&pool).await.expect("query");
        assert!(path.exists());
    }
}
