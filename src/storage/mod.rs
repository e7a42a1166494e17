//! Persistence of school records.
//!
//! This module provides:
//! - CSV read/write (the working format between pipeline stages)
//! - SQLite storage with migrations
//! - The static-site JSON export

mod csv_io;
mod migrations;
mod pool;
mod sqlite;
mod static_site;

pub use csv_io::{read_records_csv, read_records_from, write_records_csv, write_records_to, CSV_COLUMNS};
pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, open_database};
pub use sqlite::{load_sqlite, save_sqlite};
pub use static_site::{export_static_site, StaticExportSummary};
