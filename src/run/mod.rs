//! Pipeline stages behind the CLI subcommands.
//!
//! Each stage reads the dataset CSV, transforms it with the library modules,
//! writes it back (and optionally to SQLite), and returns a report value the
//! binary prints.

mod audit;
mod enrich;
mod geo;
mod merge;

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::ClassifierRules;
use crate::record::SchoolRecord;
use crate::storage::{open_database, save_sqlite};

pub use audit::run_audit;
pub use enrich::run_enrich;
pub use geo::{run_export_static, run_geocode, run_search, SearchReport};
pub use merge::{run_merge, MergeReport};

/// Loads classifier rules from a JSON file, or the built-in defaults.
pub fn load_rules(path: Option<&Path>) -> Result<ClassifierRules> {
    match path {
        Some(path) => {
            let rules = ClassifierRules::from_json_file(path)?;
            info!("Loaded classifier rules from {}", path.display());
            Ok(rules)
        }
        None => Ok(ClassifierRules::default()),
    }
}

/// Replaces the SQLite table with `records` when a database path is given.
pub(crate) async fn save_to_database(db_path: Option<&Path>, records: &[SchoolRecord]) -> Result<()> {
    let Some(db_path) = db_path else {
        return Ok(());
    };
    let pool = open_database(db_path)
        .await
        .context(format!("Failed to open database: {}", db_path.display()))?;
    save_sqlite(&pool, records)
        .await
        .context("Failed to save rows to SQLite")?;

    if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
        .execute(pool.as_ref())
        .await
    {
        log::warn!("Failed to checkpoint WAL file (this is non-critical): {}", e);
    }
    pool.close().await;
    Ok(())
}
