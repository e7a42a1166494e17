//! school_contacts library: harvesting and cleaning public school contacts
//!
//! This library turns scraped school directory pages and sector spreadsheets
//! into one deduplicated, validated and geolocated contact dataset. The core
//! (candidate harvesting, email classification, field extraction, row
//! cleaning) is synchronous and pure; website enrichment, persistence and
//! search sit on top of it.
//!
//! # Example
//!
//! ```
//! use school_contacts::{classify_email, ClassifierRules, Disposition, EmailSource};
//!
//! let rules = ClassifierRules::default();
//! let result = classify_email(
//!     "Office@Hillside.vic.edu.au",
//!     Some("https://www.hillside.vic.edu.au"),
//!     EmailSource::Mailto,
//!     &rules,
//! );
//! assert_eq!(result.disposition, Disposition::Valid);
//! assert_eq!(result.email.as_deref(), Some("office@hillside.vic.edu.au"));
//! ```
//!
//! # Requirements
//!
//! Enrichment and SQLite storage require a Tokio runtime. Use `#[tokio::main]`
//! in your application or call them from an async context.

#![warn(missing_docs)]

mod audit;
pub mod config;
mod domain;
mod enrich;
mod error_handling;
mod extract;
mod geo;
pub mod initialization;
mod record;
pub mod run;
mod storage;
mod utils;

// Re-export public API
pub use audit::{audit_emails, AuditReport};
pub use config::{ClassifierRules, HttpConfig, LogFormat, LogLevel};
pub use domain::{domains_related, registrable_domain, website_host};
pub use enrich::{
    contact_page_candidates, enrich_records, EnrichOptions, EnrichOutcome, EnrichSummary,
    FetchFailure, FetchedPage, PoliteClient, RobotsCache, RobotsRules,
};
pub use error_handling::{DatabaseError, ErrorType, InfoType, InitializationError, ProcessingStats, WarningType};
pub use extract::{
    choose_general_email, choose_tiered_email, classify_email, collect_candidates, decode_cfemail,
    extract_core_fields, extract_json_ld, extract_json_ld_contact, find_contact_form,
    find_email_candidates, normalize_email, parse_mailto, validate_email, CandidateSet, CoreFields,
    Disposition, EmailClassification, EmailReason, EmailSource, JsonLdContact,
};
pub use geo::{
    attach_coordinates, haversine_km, radius_search, resolve_location, school_postcode_centroids,
    suburb_centroids, Coordinate, GazetteerEntry, GeoError, PostcodeCentroids, ResolvedLocation,
    SearchHit, SuburbCentroid,
};
pub use record::{
    deduplicate, ensure_http, norm_key, normalise_postcode, normalize_phone, sector_summary,
    standardize, title_case, SchoolRecord, Sector, SectorSummary,
};
pub use storage::{
    export_static_site, load_sqlite, open_database, read_records_csv, read_records_from,
    run_migrations, save_sqlite, write_records_csv, write_records_to, StaticExportSummary,
    CSV_COLUMNS,
};
