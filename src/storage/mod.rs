//! Storage layer
//!
//! A thin wrapper around a SeaORM [`DatabaseConnection`] exposing the query
//! and command contracts the services need: short-code resolution (with a
//! hot-path cache), click insertion, link CRUD and the raw rows the
//! analytics aggregator buckets in memory.

mod clicks;
mod links;
mod users;

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{LinkpulseError, Result};
use migration::entities::link;
use migration::{Migrator, MigratorTrait};

pub use clicks::{CategoryCount, ClickCategory};
pub use links::{LinkPatch, LinkWithCodes, NewLink};

pub struct SeaOrmStorage {
    db: DatabaseConnection,
    /// short code -> redirectable link, invalidated on link updates
    link_cache: Cache<String, link::Model>,
}

impl SeaOrmStorage {
    /// Connect to the configured database, run migrations and build the
    /// storage wrapper.
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self> {
        let db = if database_url.starts_with("sqlite:") {
            connect_sqlite(database_url).await?
        } else if database_url.starts_with("mysql:") || database_url.starts_with("postgres:") {
            connect_generic(database_url, pool_size).await?
        } else {
            return Err(LinkpulseError::database_config(format!(
                "Unsupported database URL: {}",
                database_url
            )));
        };

        run_migrations(&db).await?;

        Ok(Self::from_connection(db))
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        let link_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self { db, link_cache }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Connect to SQLite with WAL and the usual pragmas, creating the file if
/// missing.
async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LinkpulseError::database_config(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .pragma("cache_size", "-64000")
        .pragma("temp_store", "memory");

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        LinkpulseError::database_connection(format!("Cannot connect to SQLite: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// Connect to MySQL/PostgreSQL with pool settings.
async fn connect_generic(database_url: &str, pool_size: u32) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(5))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        LinkpulseError::database_connection(format!("Cannot connect to database: {}", e))
    })
}

async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| LinkpulseError::database_operation(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
