//! Database module
//!
//! This module provides all database functionality including:
//! - Schema and migrations
//! - Model definitions
//! - Repository layer for CRUD operations and field validation

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::{initialize_database, schema_version};

use crate::config::{DB_ACQUIRE_TIMEOUT, DB_BUSY_TIMEOUT, DB_MAX_CONNECTIONS};
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

/// Open a pool over the database file at `db_path`, creating the file if needed
async fn open_pool(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(DB_BUSY_TIMEOUT)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Migrate the blog database and return the pool handlers share.
///
/// Migrations run on their own single-connection pool, closed before the
/// shared pool opens, so no pooled connection caches a pre-migration schema.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(dir) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let migrator = open_pool(db_path, 1).await?;
    initialize_database(&migrator).await?;
    migrator.close().await;

    let pool = open_pool(db_path, DB_MAX_CONNECTIONS).await?;
    tracing::info!("Blog database ready at {}", db_path.display());

    Ok(pool)
}
