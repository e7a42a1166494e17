//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DEFAULT_CHECKPOINT_EVERY, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_DELAY_SECS,
    DEFAULT_SEARCH_LIMIT, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// HTTP politeness settings for the enrichment client (no CLI dependencies).
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// User-Agent header value, also used to pick robots.txt groups
    pub user_agent: String,
    /// Minimum delay between two requests
    pub request_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt for transient failures
    pub max_retries: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay: Duration::from_secs_f64(DEFAULT_REQUEST_DELAY_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "school_contacts",
    version,
    about = "Harvest, clean, deduplicate and geolocate school contact details"
)]
pub struct Opt {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,

    /// JSON file overriding the classifier allow-lists
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Pipeline stages exposed on the command line.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Standardize and deduplicate sector CSVs into one dataset
    Merge(MergeArgs),
    /// Re-classify published emails and clear the ones that fail
    Audit(AuditArgs),
    /// Fetch school websites to fill missing emails and contact forms
    Enrich(EnrichArgs),
    /// Attach postcode-centroid coordinates to every row
    Geocode(GeocodeArgs),
    /// Write the static-site JSON bundle
    ExportStatic(ExportStaticArgs),
    /// Radius search around a postcode or place name
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Sector CSV files to merge (missing files are skipped)
    #[arg(long, required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Merged CSV output
    #[arg(long)]
    pub output: PathBuf,

    /// Optional SQLite database to write alongside the CSV
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Dataset CSV (rewritten in place)
    #[arg(long)]
    pub input: PathBuf,

    /// Optional SQLite database to refresh
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Report without writing changes
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct EnrichArgs {
    /// Dataset CSV
    #[arg(long)]
    pub input: PathBuf,

    /// Output CSV (defaults to the input file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Limit of website rows to attempt (0 = all)
    #[arg(long, default_value_t = 0)]
    pub max_sites: usize,

    /// Save the CSV every N attempted rows
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_EVERY)]
    pub checkpoint_every: usize,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Minimum delay between requests in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY_SECS)]
    pub request_delay: f64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Retries for transient failures
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,
}

impl EnrichArgs {
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            user_agent: self.user_agent.clone(),
            request_delay: Duration::from_secs_f64(self.request_delay.max(0.0)),
            timeout: Duration::from_secs(self.timeout_seconds),
            max_retries: self.max_retries,
        }
    }
}

#[derive(Debug, Args)]
pub struct GeocodeArgs {
    /// Dataset CSV (rewritten in place)
    #[arg(long)]
    pub input: PathBuf,

    /// GeoNames postal-code dump (tab separated, e.g. AU.txt)
    #[arg(long)]
    pub postcodes: PathBuf,

    /// Restrict centroids to one state code (e.g. NSW)
    #[arg(long)]
    pub state: Option<String>,

    /// Optional SQLite database to refresh
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportStaticArgs {
    /// Geocoded dataset CSV
    #[arg(long)]
    pub input: PathBuf,

    /// Output directory for the JSON bundle
    #[arg(long)]
    pub out_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Geocoded dataset CSV
    #[arg(long)]
    pub input: PathBuf,

    /// Postcode or place name
    #[arg(long)]
    pub location: String,

    /// Search radius in kilometres
    #[arg(long, default_value_t = 20.0)]
    pub radius_km: f64,

    /// Maximum hits returned
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,

    /// GeoNames postal-code dump used to resolve postcodes and place names
    #[arg(long)]
    pub postcodes: Option<PathBuf>,

    /// Restrict gazetteer entries to one state code
    #[arg(long)]
    pub state: Option<String>,
}
