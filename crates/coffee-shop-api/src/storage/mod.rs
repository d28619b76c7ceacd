//! SQLite storage for the drinks menu

mod drinks;

pub use drinks::DrinkRepository;

use crate::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Title of the drink seeded by [`Database::drop_and_create_all`]
pub const SEED_DRINK_TITLE: &str = "water";

const SEED_DRINK_RECIPE: &str = r#"[{"name":"water","color":"blue","parts":1}]"#;

const CREATE_DRINKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("A drink titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("Stored recipe is not valid JSON: {0}")]
    CorruptRecipe(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Connection pool and schema management
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.run_migrations().await?;

        info!("Connected to database {}", config.url);
        Ok(database)
    }

    /// Get access to the underlying database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn drinks(&self) -> DrinkRepository {
        DrinkRepository::new(self.pool.clone())
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_DRINKS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop every table, recreate the schema and seed the default drink.
    ///
    /// All stored drinks are lost.
    pub async fn drop_and_create_all(&self) -> Result<(), StorageError> {
        warn!("Dropping and recreating all tables");

        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_DRINKS_TABLE).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
            .bind(SEED_DRINK_TITLE)
            .bind(SEED_DRINK_RECIPE)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::NamedTempFile;

    /// Migrated database in a temporary file. Keep the file alive for the test.
    pub(crate) async fn create_test_database() -> (Database, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:{}", temp_file.path().display()),
            ..DatabaseConfig::default()
        };
        let database = Database::connect(&config).await.unwrap();
        (database, temp_file)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::create_test_database;
    use super::*;
    use coffee_shop_common::types::RecipePart;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let (db, _file) = create_test_database().await;
        db.run_migrations().await.unwrap();
        assert!(db.drinks().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_and_create_all_seeds_water() {
        let (db, _file) = create_test_database().await;
        db.drop_and_create_all().await.unwrap();

        let drinks = db.drinks().list().await.unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].title, SEED_DRINK_TITLE);
        assert_eq!(
            drinks[0].recipe,
            vec![RecipePart {
                name: "water".to_string(),
                color: "blue".to_string(),
                parts: 1,
            }]
        );

        // A second reset discards everything and seeds again
        db.drop_and_create_all().await.unwrap();
        assert_eq!(db.drinks().list().await.unwrap().len(), 1);
    }
}
