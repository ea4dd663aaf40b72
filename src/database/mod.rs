use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Pool, Sqlite};
use tracing::info;

use crate::assets::MigrationAssets;
use crate::config::DatabaseConfig;

pub mod favicons;

/// Shared database handle
///
/// Owns the SQLite connection pool for the lifetime of the process. The
/// pool itself is internally reference-counted, so cloning this handle is
/// cheap and safe across tasks.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub fn pool(&self) -> Pool<Sqlite> {
        self.pool.clone()
    }

    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        Self::ensure_parent_directory(&config.url)?;

        // Create the database file if it doesn't exist yet
        if !Sqlite::database_exists(&config.url).await.unwrap_or(false) {
            Sqlite::create_database(&config.url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(10))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the directory a file-backed SQLite URL points into.
    fn ensure_parent_directory(url: &str) -> Result<()> {
        if url.contains(":memory:") {
            return Ok(());
        }

        let file_path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        let file_path = file_path.split('?').next().unwrap_or(file_path);

        if let Some(parent) = std::path::Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created database directory: {}", parent.display());
            }
        }

        Ok(())
    }

    /// Apply embedded migrations that have not run yet.
    pub async fn migrate(&self) -> Result<()> {
        // Bookkeeping table recording which migration files have run
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for (name, content) in MigrationAssets::get_migrations() {
            // Filenames carry the version prefix: "001_create_favicons.sql"
            let version: i64 = name
                .split('_')
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| anyhow::anyhow!("Migration {name} has no numeric prefix"))?;

            let already_applied = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM _migrations WHERE version = ?",
            )
            .bind(version)
            .fetch_one(&self.pool)
            .await?;

            if already_applied > 0 {
                continue;
            }

            let mut transaction = self.pool.begin().await?;

            // Migration files may hold several statements
            for statement in content.split(';') {
                let statement = statement.trim();
                if statement.is_empty() {
                    continue;
                }
                if let Err(e) = sqlx::query(statement).execute(&mut *transaction).await {
                    transaction.rollback().await?;
                    return Err(anyhow::anyhow!("Migration {name} failed: {e}"));
                }
            }

            sqlx::query("INSERT INTO _migrations (version, description) VALUES (?, ?)")
                .bind(version)
                .bind(&name)
                .execute(&mut *transaction)
                .await?;

            transaction.commit().await?;
            info!("Applied migration: {name}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_database() -> Database {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        Database { pool }
    }

    #[tokio::test]
    async fn migrations_create_favicons_table() {
        let database = memory_database().await;
        database.migrate().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favicons")
            .fetch_one(&database.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let database = memory_database().await;
        database.migrate().await.unwrap();
        database.migrate().await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&database.pool())
            .await
            .unwrap();
        assert_eq!(applied as usize, MigrationAssets::get_migrations().len());
    }
}
