//! Database connection pool management.
//!
//! Opens (creating if needed) the SQLite file with WAL mode enabled and the
//! schema migrated.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error};
use sqlx::{Pool, Sqlite, SqlitePool};

use super::migrations::run_migrations;
use crate::error_handling::DatabaseError;

/// Opens a database file, creating it when missing, and enables WAL mode.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| DatabaseError::FileCreationError(e.to_string()))?;
    }

    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => debug!("Database file created: {}", db_path_str),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Database file already exists: {}", db_path_str)
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(DatabaseError::FileCreationError(e.to_string()));
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(Arc::new(pool))
}

/// Opens the database and brings its schema up to date.
pub async fn open_database(db_path: &Path) -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    let pool = init_db_pool_with_path(db_path).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
