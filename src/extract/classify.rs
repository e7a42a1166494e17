//! Email normalization and classification.
//!
//! A candidate is normalized, then run through ordered checks; the first
//! failing check decides the disposition and reason. Rejections are values,
//! never errors.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter as EnumIterMacro;

use crate::config::ClassifierRules;
use crate::domain::{domains_related, website_host};
use crate::utils::compile_regex_unsafe;
use crate::utils::sanitize::{strip_invisible, strip_leading_encoding, strip_surrounding_punctuation};

static STRICT_EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$",
        "STRICT_EMAIL_PATTERN",
    )
});

/// Where a candidate was found. Decides how strictly an unrelated domain is
/// treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIterMacro)]
#[serde(rename_all = "lowercase")]
pub enum EmailSource {
    /// `mailto:` anchor
    Mailto,
    /// Visible page text (plain or spelled-out)
    Text,
    /// JSON-LD structured data
    JsonLd,
    /// Official directory listing
    Directory,
    /// Unknown or mixed provenance (audits of stored data)
    Mixed,
    /// Cloudflare email protection
    Cloudflare,
}

impl EmailSource {
    /// Stable lowercase label used in CSV and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailSource::Mailto => "mailto",
            EmailSource::Text => "text",
            EmailSource::JsonLd => "jsonld",
            EmailSource::Directory => "directory",
            EmailSource::Mixed => "mixed",
            EmailSource::Cloudflare => "cloudflare",
        }
    }

    /// Directory and mixed sources skip the domain-relationship check.
    fn checks_domain_relationship(&self) -> bool {
        !matches!(self, EmailSource::Directory | EmailSource::Mixed)
    }
}

/// Outcome category of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIterMacro)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Passed every check
    Valid,
    /// Well-formed but on an unrelated domain from a trusted channel
    Suspicious,
    /// Rejected
    Invalid,
}

impl Disposition {
    /// Stable lowercase label used in CSV and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Valid => "valid",
            Disposition::Suspicious => "suspicious",
            Disposition::Invalid => "invalid",
        }
    }
}

/// Reason code attached to every classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIterMacro)]
#[serde(rename_all = "snake_case")]
pub enum EmailReason {
    /// Passed every check
    Ok,
    /// Nothing left after normalization
    Empty,
    /// Whitespace, wrong `@` count, or grammar failure
    InvalidFormat,
    /// Local part shorter than two characters
    LocalTooShort,
    /// Template or sample domain
    PlaceholderDomain,
    /// Domain without a dot
    MissingTld,
    /// TLD not purely alphabetic
    InvalidTldFormat,
    /// TLD outside the allow-list
    InvalidTld,
    /// Unrelated domain harvested from page text
    UnrelatedDomainLowConfidence,
    /// Unrelated domain from a higher-confidence channel
    UnrelatedDomain,
}

impl EmailReason {
    /// Stable lowercase label used in CSV and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailReason::Ok => "ok",
            EmailReason::Empty => "empty",
            EmailReason::InvalidFormat => "invalid_format",
            EmailReason::LocalTooShort => "local_too_short",
            EmailReason::PlaceholderDomain => "placeholder_domain",
            EmailReason::MissingTld => "missing_tld",
            EmailReason::InvalidTldFormat => "invalid_tld_format",
            EmailReason::InvalidTld => "invalid_tld",
            EmailReason::UnrelatedDomainLowConfidence => "unrelated_domain_low_confidence",
            EmailReason::UnrelatedDomain => "unrelated_domain",
        }
    }
}

impl std::fmt::Display for EmailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailClassification {
    /// Normalized address; present for valid and suspicious results only
    pub email: Option<String>,
    /// Outcome category
    pub disposition: Disposition,
    /// First failing check, or `ok`
    pub reason: EmailReason,
}

impl EmailClassification {
    fn invalid(reason: EmailReason) -> Self {
        Self {
            email: None,
            disposition: Disposition::Invalid,
            reason,
        }
    }

    /// True for `valid/ok`.
    pub fn is_valid(&self) -> bool {
        self.disposition == Disposition::Valid
    }
}

/// Normalizes a raw candidate: invisible characters, `mailto:` prefix,
/// encoding residue and surrounding punctuation removed, lowercased.
pub fn normalize_email(raw: &str) -> String {
    let visible = strip_invisible(raw);
    let mut rest = visible.trim();
    if rest.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("mailto:")) {
        rest = &rest[7..];
    }
    let rest = strip_leading_encoding(rest);
    strip_surrounding_punctuation(rest).to_lowercase()
}

/// Checks the strict `local@domain.tld` grammar only, returning the
/// normalized address.
pub fn validate_email(raw: &str) -> Option<String> {
    let email = normalize_email(raw);
    STRICT_EMAIL_PATTERN.is_match(&email).then_some(email)
}

/// Classifies one candidate email.
///
/// `website_url` is the school's own website; when it yields a usable host,
/// addresses on unrelated domains are downgraded according to `source`.
///
/// # Examples
///
/// ```
/// use school_contacts::{classify_email, ClassifierRules, Disposition, EmailReason, EmailSource};
///
/// let rules = ClassifierRules::default();
/// let result = classify_email(
///     "Info@School.nsw.edu.au.",
///     Some("https://school.nsw.edu.au"),
///     EmailSource::Text,
///     &rules,
/// );
/// assert_eq!(result.email.as_deref(), Some("info@school.nsw.edu.au"));
/// assert_eq!(result.disposition, Disposition::Valid);
/// assert_eq!(result.reason, EmailReason::Ok);
/// ```
pub fn classify_email(
    raw: &str,
    website_url: Option<&str>,
    source: EmailSource,
    rules: &ClassifierRules,
) -> EmailClassification {
    let email = normalize_email(raw);
    if email.is_empty() {
        return EmailClassification::invalid(EmailReason::Empty);
    }

    if email.chars().any(char::is_whitespace) || email.matches('@').count() != 1 {
        return EmailClassification::invalid(EmailReason::InvalidFormat);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return EmailClassification::invalid(EmailReason::InvalidFormat);
    };

    if !domain.contains('.') {
        return EmailClassification::invalid(EmailReason::MissingTld);
    }
    if !STRICT_EMAIL_PATTERN.is_match(&email) {
        return EmailClassification::invalid(EmailReason::InvalidFormat);
    }
    if local.chars().count() < 2 {
        return EmailClassification::invalid(EmailReason::LocalTooShort);
    }
    if rules.placeholder_domains.contains(domain) {
        return EmailClassification::invalid(EmailReason::PlaceholderDomain);
    }

    let tld = domain.rsplit('.').next().unwrap_or_default();
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return EmailClassification::invalid(EmailReason::InvalidTldFormat);
    }
    if !rules.allowed_tlds.contains(tld) {
        return EmailClassification::invalid(EmailReason::InvalidTld);
    }

    if source.checks_domain_relationship() && !rules.is_trusted_domain(domain) {
        if let Some(host) = website_url.and_then(website_host) {
            if !domains_related(domain, &host, rules) {
                if source == EmailSource::Text {
                    return EmailClassification::invalid(
                        EmailReason::UnrelatedDomainLowConfidence,
                    );
                }
                return EmailClassification {
                    email: Some(email),
                    disposition: Disposition::Suspicious,
                    reason: EmailReason::UnrelatedDomain,
                };
            }
        }
    }

    EmailClassification {
        email: Some(email),
        disposition: Disposition::Valid,
        reason: EmailReason::Ok,
    }
}
