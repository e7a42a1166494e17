//! Domain extraction and comparison utilities.
//!
//! This module provides the host/registrable-domain reasoning the email
//! classifier uses to decide whether an address belongs to a school website.
//!
//! Key functions:
//! - `website_host()` - Extracts the normalized host from a website URL
//! - `registrable_domain()` - Reduces a host to its registrable domain
//! - `domains_related()` - Equal, subdomain, or same registrable domain

use crate::config::ClassifierRules;

/// Lowercases a host and strips a trailing dot and a leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Extracts the normalized host from a website URL.
///
/// Accepts scheme-less input (`school.edu.au/contact`) by assuming https.
/// Returns `None` for unparseable URLs, URLs without a host, and IP addresses
/// (which have no registrable domain).
pub fn website_host(website_url: &str) -> Option<String> {
    let trimmed = website_url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = url::Url::parse(trimmed)
        .ok()
        .filter(|u| u.has_host())
        .or_else(|| url::Url::parse(&format!("https://{trimmed}")).ok())?;

    match parsed.host()? {
        url::Host::Domain(domain) => {
            let host = normalize_host(domain);
            (!host.is_empty()).then_some(host)
        }
        url::Host::Ipv4(_) | url::Host::Ipv6(_) => None,
    }
}

/// Reduces a host to its registrable domain.
///
/// After stripping `www.`, hosts ending in one of the configured two-level
/// public suffixes (`edu.au`, `com.au`, ...) keep their last three labels when
/// they have at least three; every other host keeps its last two labels.
///
/// # Examples
///
/// ```
/// use school_contacts::{registrable_domain, ClassifierRules};
///
/// let rules = ClassifierRules::default();
/// assert_eq!(registrable_domain("www.school.edu.au", &rules), "school.edu.au");
/// assert_eq!(registrable_domain("mail.example.com", &rules), "example.com");
/// ```
pub fn registrable_domain(host: &str, rules: &ClassifierRules) -> String {
    let host = normalize_host(host);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    let two_level = rules
        .two_level_suffixes
        .iter()
        .any(|suffix| host.ends_with(&format!(".{suffix}")));

    let keep = if two_level && labels.len() >= 3 { 3 } else { 2 };
    if labels.len() <= keep {
        return labels.join(".");
    }
    labels[labels.len() - keep..].join(".")
}

/// Returns true when `email_domain` is the website host, a subdomain of it,
/// or shares its registrable domain.
pub fn domains_related(email_domain: &str, website_host: &str, rules: &ClassifierRules) -> bool {
    let email_domain = normalize_host(email_domain);
    let website_host = normalize_host(website_host);

    if email_domain == website_host || email_domain.ends_with(&format!(".{website_host}")) {
        return true;
    }
    registrable_domain(&email_domain, rules) == registrable_domain(&website_host, rules)
}
