use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::storage::table::{RELATIONS, TABLES};

/// DbConnection owns the pool shared by every collection
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database described by `config` and
    /// make sure every table exists
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let url = config.database_url.as_str();

        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        // Foreign keys are declared in the schema but not enforced: rows may
        // reference classes, CCAs or students that were never inserted.
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let config = StorageConfig {
            database_url: format!("file:memdb_{}?mode=memory&cache=shared", test_id),
            max_connections: 1,
        };

        Self::new(&config).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create every entity and relation table if absent
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for table in TABLES {
            debug!("Ensuring table {}", table.name);
            sqlx::query(table.schema).execute(pool).await?;
        }

        for relation in RELATIONS {
            debug!("Ensuring relation table {}", relation.name);
            sqlx::query(relation.schema).execute(pool).await?;
        }

        Ok(())
    }
}
