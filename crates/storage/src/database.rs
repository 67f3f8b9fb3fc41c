//! Connection pool and schema bootstrap

use std::str::FromStr;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::{Session, StorageError};

const CREATE_SENSORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sensors (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name     TEXT NOT NULL,
    "type"   TEXT NOT NULL,
    location TEXT NOT NULL,
    unit     TEXT,
    value    REAL,
    status   TEXT
)
"#;

const CREATE_LOCATION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sensors_location ON sensors (location)";

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://sensors.db`
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://sensors.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Handle to the SQLite pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool, creating the database file if it does not exist
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!(
            "Opened SQLite pool at {} (max {} connections)",
            config.url, config.max_connections
        );
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` sees its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create the `sensors` table if absent. Run once before serving.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_SENSORS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_LOCATION_INDEX).execute(&self.pool).await?;
        info!("Sensor schema ready");
        Ok(())
    }

    /// Check out a connection for one unit of work
    pub async fn session(&self) -> Result<Session, StorageError> {
        let conn = self.pool.acquire().await?;
        Ok(Session::new(conn))
    }

    /// Wait for checked-out connections to return, then close the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
