//! SQLite persistence helpers
//!
//! Pool construction, embedded migrations, and the row models shared by the
//! ingestion tool and the query server.

pub mod models;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CommonError, Result};

pub use models::{Claim, ClaimDetail, ClaimFlag, ClaimNote, User, CLAIM_COLUMNS};

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://claims.db";

/// Default maximum connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default connection acquire timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Database connection settings
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    /// Read `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS` and
    /// `DATABASE_CONNECT_TIMEOUT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(CommonError::Config("Database URL cannot be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(CommonError::Config(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Open a connection pool, creating the database file if needed
#[tracing::instrument(skip(config), fields(url = %config.url))]
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    config.validate()?;

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::debug!("Database connection pool established");
    Ok(pool)
}

/// Open a private in-memory database with the schema applied.
///
/// The pool holds exactly one connection that never expires, since every
/// new SQLite memory connection would otherwise see an empty database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::debug!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = DatabaseConfig {
            url: String::new(),
            ..DatabaseConfig::default()
        };
        assert!(matches!(config.validate(), Err(CommonError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_in_memory_schema_applied() {
        let pool = connect_in_memory().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            ..DatabaseConfig::default()
        };

        let pool = connect(&config).await.unwrap();
        migrate(&pool).await.unwrap();
        assert!(path.exists());
    }
}
