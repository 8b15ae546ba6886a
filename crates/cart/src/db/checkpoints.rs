//! `PostgreSQL` checkpoint repository.
//!
//! The table name is configurable, so queries are built at runtime with
//! `sqlx::query` rather than the compile-time checked macros. The name is
//! validated as a plain identifier before it is ever interpolated.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::{Checkpoint, CheckpointError, CheckpointStore};
use crate::config::{CartConfig, DEFAULT_CHECKPOINT_TABLE, validate_table_name};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the bundled migrations (creates the default `shopping_cart` table).
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Repository for stored carts.
#[derive(Debug, Clone)]
pub struct PgCheckpointRepository {
    pool: PgPool,
    table: String,
}

impl PgCheckpointRepository {
    /// Create a repository over the default `shopping_cart` table.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: DEFAULT_CHECKPOINT_TABLE.to_string(),
        }
    }

    /// Create a repository over a custom table.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError::DataCorruption` if `table` is not a plain
    /// (optionally schema-qualified) SQL identifier.
    pub fn with_table(pool: PgPool, table: &str) -> Result<Self, CheckpointError> {
        validate_table_name(table).map_err(CheckpointError::DataCorruption)?;
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Create a repository over the table named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError::DataCorruption` if the configured table name
    /// is not a plain SQL identifier.
    pub fn from_config(pool: PgPool, config: &CartConfig) -> Result<Self, CheckpointError> {
        Self::with_table(pool, &config.checkpoint_table)
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl CheckpointStore for PgCheckpointRepository {
    async fn upsert(&self, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        let mut tx = self.pool.begin().await?;

        let delete = format!(
            "DELETE FROM {} WHERE identifier = $1 AND instance = $2",
            self.table
        );
        sqlx::query(&delete)
            .bind(&checkpoint.identifier)
            .bind(&checkpoint.instance)
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO {} (identifier, instance, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
            self.table
        );
        sqlx::query(&insert)
            .bind(&checkpoint.identifier)
            .bind(&checkpoint.instance)
            .bind(&checkpoint.content)
            .bind(checkpoint.created_at)
            .bind(checkpoint.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find(
        &self,
        identifier: &str,
        instance: &str,
    ) -> Result<Option<Checkpoint>, CheckpointError> {
        let select = format!(
            "SELECT identifier, instance, content, created_at, updated_at \
             FROM {} WHERE identifier = $1 AND instance = $2",
            self.table
        );
        let row = sqlx::query(&select)
            .bind(identifier)
            .bind(instance)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| -> Result<Checkpoint, CheckpointError> {
            Ok(Checkpoint {
                identifier: r.try_get("identifier")?,
                instance: r.try_get("instance")?,
                content: r.try_get("content")?,
                created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
                updated_at: r.try_get::<DateTime<Utc>, _>("updated_at")?,
            })
        })
        .transpose()
    }

    async fn delete(&self, identifier: &str, instance: &str) -> Result<bool, CheckpointError> {
        let delete = format!(
            "DELETE FROM {} WHERE identifier = $1 AND instance = $2",
            self.table
        );
        let result = sqlx::query(&delete)
            .bind(identifier)
            .bind(instance)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, identifier: &str) -> Result<u64, CheckpointError> {
        let delete = format!("DELETE FROM {} WHERE identifier = $1", self.table);
        let result = sqlx::query(&delete)
            .bind(identifier)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
