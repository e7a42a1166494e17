//! Classifier allow-lists.
//!
//! The TLD allow-list, placeholder domains, trusted centralized mail domains,
//! general-mailbox prefixes and two-level public suffixes are jurisdiction
//! specific, so they live here as data rather than inside the classifier.
//! New jurisdictions extend them through a JSON rules file (`--rules`).

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ALLOWED_TLDS: &[&str] = &["au", "com", "org", "net", "edu", "gov", "school", "online"];

const DEFAULT_PLACEHOLDER_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "example.edu",
    "example.com.au",
    "domain.com",
    "yourdomain.com",
    "yourschool.edu.au",
    "email.com",
    "test.com",
];

/// Statewide education-department mail domains. Schools publish their own
/// website domain but route mail through these.
const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "det.nsw.edu.au",
    "education.nsw.gov.au",
    "education.vic.gov.au",
    "eq.edu.au",
    "education.wa.edu.au",
    "schools.sa.edu.au",
    "education.tas.gov.au",
    "ed.act.edu.au",
    "ntschools.net",
];

const DEFAULT_GENERAL_PREFIXES: &[&str] = &[
    "info",
    "admin",
    "office",
    "contact",
    "enquiries",
    "enquiry",
    "reception",
    "registrar",
    "school",
];

const DEFAULT_TWO_LEVEL_SUFFIXES: &[&str] = &["com.au", "edu.au", "gov.au", "org.au", "net.au"];

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Allow-lists consulted by the email classifier and selector.
///
/// Every list is lowercase. Missing keys in a rules file fall back to the
/// built-in defaults, so a file only needs the entries it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    /// Top-level labels accepted in an email domain
    pub allowed_tlds: BTreeSet<String>,
    /// Domains that only ever appear in templates and sample text
    pub placeholder_domains: BTreeSet<String>,
    /// Centralized mail domains exempt from the domain-relationship check
    pub trusted_domains: BTreeSet<String>,
    /// Local-part prefixes of role-based mailboxes, in no particular order
    pub general_prefixes: Vec<String>,
    /// Public suffixes with two labels (registrable domain keeps three labels)
    pub two_level_suffixes: BTreeSet<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            allowed_tlds: to_set(DEFAULT_ALLOWED_TLDS),
            placeholder_domains: to_set(DEFAULT_PLACEHOLDER_DOMAINS),
            trusted_domains: to_set(DEFAULT_TRUSTED_DOMAINS),
            general_prefixes: DEFAULT_GENERAL_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            two_level_suffixes: to_set(DEFAULT_TWO_LEVEL_SUFFIXES),
        }
    }
}

impl ClassifierRules {
    /// Loads rules from a JSON file, lowercasing every entry.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Failed to parse rules file: {}", path.display()))
    }

    /// Parses rules from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let rules: ClassifierRules = serde_json::from_str(raw)?;
        Ok(rules.lowercased())
    }

    /// Adds a trusted mail domain, returning the updated rules.
    pub fn with_trusted_domain(mut self, domain: &str) -> Self {
        self.trusted_domains.insert(domain.trim().to_lowercase());
        self
    }

    /// Whether `domain` is a trusted mail domain or a subdomain of one.
    pub fn is_trusted_domain(&self, domain: &str) -> bool {
        self.trusted_domains
            .iter()
            .any(|t| domain == t || domain.ends_with(&format!(".{t}")))
    }

    fn lowercased(self) -> Self {
        let lower = |set: BTreeSet<String>| -> BTreeSet<String> {
            set.into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            allowed_tlds: lower(self.allowed_tlds),
            placeholder_domains: lower(self.placeholder_domains),
            trusted_domains: lower(self.trusted_domains),
            general_prefixes: self
                .general_prefixes
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            two_level_suffixes: lower(self.two_level_suffixes),
        }
    }
}
