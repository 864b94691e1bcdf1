use crate::config::DatabaseConfig;
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Pool, Sqlite};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

pub mod filter_rules;
pub mod missing_streams;
pub mod providers;
pub mod streams;

/// Embedded migrations, applied in order at startup
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "001_initial_schema",
    include_str!("../../migrations/001_initial_schema.sql"),
)];

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        // Create database if it doesn't exist (for SQLite)
        if !Sqlite::database_exists(&config.url).await? {
            Sqlite::create_database(&config.url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(10))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
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

        for (version, name, content) in MIGRATIONS {
            let applied = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM _migrations WHERE version = ?",
            )
            .bind(version)
            .fetch_one(&self.pool)
            .await?;

            if applied > 0 {
                continue;
            }

            let mut tx = self.pool.begin().await?;
            // Migration files may contain several statements
            for statement in content.split(';') {
                let statement = statement.trim();
                if statement.is_empty() {
                    continue;
                }
                sqlx::query(statement).execute(&mut *tx).await?;
            }
            sqlx::query("INSERT INTO _migrations (version, description) VALUES (?, ?)")
                .bind(version)
                .bind(name)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!("Applied migration: {}", name);
        }

        Ok(())
    }
}

/// Parse a TEXT column holding a UUID; corrupt rows surface as internal errors
pub(crate) fn parse_uuid(value: &str, column: &str) -> AppResult<Uuid> {
    value
        .parse()
        .map_err(|_| AppError::internal(format!("invalid UUID in column {column}: {value}")))
}
