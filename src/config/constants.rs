//! Configuration constants.
//!
//! This module defines the constants used throughout the pipeline, including
//! HTTP politeness defaults, extraction limits and persistence names.

/// Default User-Agent string for enrichment requests.
///
/// Identifies the crawler honestly so site operators can match it in
/// `robots.txt`. Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "school_contacts/0.1 (+https://github.com/school-contacts; public directory enrichment)";

/// Token matched against `User-agent:` lines in robots.txt, in addition to `*`.
pub const ROBOTS_AGENT_TOKEN: &str = "school_contacts";

// HTTP politeness
/// Minimum delay between two requests issued by the same client, in seconds
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 1.0;
/// Per-request timeout in seconds
/// Capped at 10s for homepage enrichment; slow school sites rarely answer later
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Retries after the initial attempt for transient failures (429/5xx/transport)
pub const DEFAULT_MAX_RETRIES: usize = 1;
/// Initial backoff in milliseconds before the first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_FIRST_ERROR: u16 = 400;
pub const HTTP_STATUS_FIRST_SERVER_ERROR: u16 = 500;

/// Maximum response body size in bytes (2MB)
/// Larger pages are truncated before parsing
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

// Enrichment
/// Maximum number of contact-page candidates tried after the homepage
pub const MAX_CONTACT_PAGE_CANDIDATES: usize = 8;
/// Well-known contact paths tried on every site after the discovered links
pub const CONTACT_PAGE_PATHS: &[&str] = &[
    "/contact",
    "/contact-us",
    "/contactus",
    "/about/contact",
    "/about-us/contact",
    "/enrolments",
];
/// Default number of attempted rows between checkpoint saves
pub const DEFAULT_CHECKPOINT_EVERY: usize = 50;

// Persistence
/// SQLite table holding the canonical rows
pub const SCHOOLS_TABLE: &str = "schools_contacts";
/// Static-site export file names
pub const STATIC_SCHOOLS_FILE: &str = "schools.min.json";
pub const STATIC_POSTCODE_CENTROIDS_FILE: &str = "postcode_centroids.min.json";
pub const STATIC_SUBURB_CENTROIDS_FILE: &str = "suburb_centroids.min.json";

// Search
/// Mean Earth radius in kilometres used by the haversine distance
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Default and maximum number of radius-search hits
pub const DEFAULT_SEARCH_LIMIT: usize = 500;
pub const MAX_SEARCH_LIMIT: usize = 2000;

/// Maximum URL length accepted when normalizing website URLs
pub const MAX_URL_LENGTH: usize = 2048;
