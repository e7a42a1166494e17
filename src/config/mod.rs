//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (politeness defaults, limits, file names)
//! - Classifier allow-lists loaded from JSON
//! - CLI option types and parsing

mod constants;
mod rules;
mod types;

// Re-export all constants
pub use constants::*;
pub use rules::ClassifierRules;
pub use types::{
    AuditArgs, Command, EnrichArgs, ExportStaticArgs, GeocodeArgs, HttpConfig, LogFormat,
    LogLevel, MergeArgs, Opt, SearchArgs,
};
