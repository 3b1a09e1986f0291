//! Database schema and migrations
//!
//! Migrations are plain SQL files applied in version order, each inside its
//! own transaction. Field constraints on blogs are also declared in the
//! schema as CHECK constraints, so rows that bypass the repository still
//! cannot break them.

use crate::error::Result;
use sqlx::sqlite::SqlitePool;

/// One schema change
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_blogs",
    sql: include_str!("migrations/001_initial_schema.sql"),
}];

/// Bring the schema up to the latest migration
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current = schema_version(pool).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        tracing::debug!("Schema is up to date at version {}", current);
        return Ok(());
    }

    for migration in pending {
        apply(pool, migration).await?;
    }

    tracing::info!("Schema migrated to version {}", schema_version(pool).await?);
    Ok(())
}

/// Highest applied migration version, 0 for a fresh database
pub async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    let version: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?;

    Ok(version)
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    tracing::info!(
        "Applying migration {} ({})",
        migration.version,
        migration.name
    );

    let mut tx = pool.begin().await?;

    sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;

    sqlx::query("INSERT INTO migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_database() {
        let pool = memory_pool().await;

        initialize_database(&pool).await.unwrap();

        assert_eq!(schema_version(&pool).await.unwrap(), 1);

        let name: String = sqlx::query_scalar("SELECT name FROM migrations WHERE version = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, "create_blogs");

        let blogs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(blogs, 0);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = memory_pool().await;

        initialize_database(&pool).await.unwrap();
        initialize_database(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn test_check_constraints_reject_short_fields() {
        let pool = memory_pool().await;
        initialize_database(&pool).await.unwrap();

        let result = sqlx::query("INSERT INTO blogs (id, title, body, image) VALUES (?, ?, ?, ?)")
            .bind("short-title")
            .bind("xyz")
            .bind("a body that is comfortably longer than thirty characters")
            .bind(vec![1u8, 2, 3])
            .execute(&pool)
            .await;
        assert!(result.is_err());

        let result = sqlx::query("INSERT INTO blogs (id, title, body, image) VALUES (?, ?, ?, ?)")
            .bind("empty-image")
            .bind("a valid title")
            .bind("a body that is comfortably longer than thirty characters")
            .bind(Vec::<u8>::new())
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
