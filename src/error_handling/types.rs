//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Types of errors that can occur while enriching one row from its website.
///
/// Each failed row carries exactly one of these in its outcome; the run
/// aggregates them into [`super::ProcessingStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// Website URL could not be parsed or normalized
    InvalidWebsiteUrl,
    /// robots.txt disallows the page (or could not be read)
    RobotsDisallowed,
    HttpRequestTimeoutError,
    HttpRequestConnectError,
    HttpRequestBodyError,
    HttpRequestOtherError,
    /// Final response status was 4xx/5xx
    HttpRequestStatusError,
    HttpRequestTooManyRequests,
}

/// Types of warnings that can occur during enrichment.
///
/// Warnings indicate missing optional data that doesn't make the row fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)] // All variants start with "No" by design
pub enum WarningType {
    NoEmailFound,
    NoContactFormFound,
    /// Candidates were present but none survived classification
    NoValidCandidate,
}

/// Informational metrics tracked during enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    EmailFilled,
    ContactFormFilled,
    /// A contact-page candidate was fetched after the homepage
    ContactPageFallback,
    /// Row skipped because it was already checked in this campaign
    AlreadyChecked,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidWebsiteUrl => "Invalid website URL",
            ErrorType::RobotsDisallowed => "Blocked by robots.txt",
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
            ErrorType::HttpRequestStatusError => "HTTP request status error",
            ErrorType::HttpRequestTooManyRequests => "Too many requests",
        }
    }
}

impl WarningType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::NoEmailFound => "No email found",
            WarningType::NoContactFormFound => "No contact form found",
            WarningType::NoValidCandidate => "No candidate passed classification",
        }
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::EmailFilled => "Email filled",
            InfoType::ContactFormFilled => "Contact form filled",
            InfoType::ContactPageFallback => "Contact page fallback fetched",
            InfoType::AlreadyChecked => "Already checked this campaign",
        }
    }
}
