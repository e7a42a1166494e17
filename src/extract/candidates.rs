//! Raw email candidate harvesting.
//!
//! Candidates come from four channels, kept apart so callers can attach
//! per-channel provenance when selecting:
//! - `mailto:` anchors
//! - spelled-out "at/dot" obfuscation in visible text
//! - plain addresses in visible text
//! - Cloudflare hex-protected addresses

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::cloudflare::find_cloudflare_emails;
use crate::utils::sanitize::{clean_candidate, strip_invisible};
use crate::utils::{compile_regex_unsafe, parse_selector_unsafe, visible_text};

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "ANCHOR_SELECTOR"));

static PLAIN_EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b",
        "PLAIN_EMAIL_PATTERN",
    )
});

/// `local at domain dot tld`, with `(at)`, `[at]`, `{at}` and the same for
/// `dot`; literal dots may be mixed in.
static OBFUSCATED_EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"(?i)([A-Z0-9._%+-]+)(\s*[(\[{]\s*at\s*[)\]}]\s*|\s+at\s+)((?:[A-Z0-9-]+(?:\s*[(\[{]\s*dot\s*[)\]}]\s*|\s+dot\s+|\.))+[A-Z]{2,})\b",
        "OBFUSCATED_EMAIL_PATTERN",
    )
});

static OBFUSCATED_DOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"(?i)\s*[(\[{]\s*dot\s*[)\]}]\s*|\s+dot\s+",
        "OBFUSCATED_DOT_PATTERN",
    )
});

/// Raw candidates per harvesting channel, each deduplicated case-insensitively
/// in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    /// Addresses from `mailto:` anchors
    pub mailto: Vec<String>,
    /// Addresses rebuilt from spelled-out "at/dot" text
    pub obfuscated: Vec<String>,
    /// Addresses matched by the plain regex in visible text
    pub text: Vec<String>,
    /// Addresses decoded from Cloudflare email protection
    pub cloudflare: Vec<String>,
}

impl CandidateSet {
    /// Union of every channel in the order mailto, obfuscated, text, hex.
    pub fn all(&self) -> Vec<String> {
        dedupe_case_insensitive(
            self.mailto
                .iter()
                .chain(&self.obfuscated)
                .chain(&self.text)
                .chain(&self.cloudflare)
                .cloned(),
        )
    }

    /// Obfuscated and plain-text candidates, the lowest-confidence channels.
    pub fn text_channel(&self) -> Vec<String> {
        dedupe_case_insensitive(self.obfuscated.iter().chain(&self.text).cloned())
    }

    /// True when no channel produced anything.
    pub fn is_empty(&self) -> bool {
        self.mailto.is_empty()
            && self.obfuscated.is_empty()
            && self.text.is_empty()
            && self.cloudflare.is_empty()
    }
}

fn dedupe_case_insensitive(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| !item.is_empty() && seen.insert(item.to_lowercase()))
        .collect()
}

/// Extracts the addresses from a `mailto:` target.
///
/// The query string is dropped, percent-encoding decoded, and comma or
/// semicolon separated lists split. Returns nothing for non-mailto targets.
pub fn parse_mailto(href: &str) -> Vec<String> {
    let href = href.trim();
    let Some(target) = href
        .get(..7)
        .filter(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
        .map(|_| &href[7..])
    else {
        return Vec::new();
    };

    let address_part = target.split('?').next().unwrap_or_default();
    let decoded = urlencoding::decode(address_part)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| address_part.to_string());

    decoded
        .split([',', ';'])
        .map(clean_candidate)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Encoded spaces glued to an address would otherwise become part of the
/// local part (`%20info@...` matches as `20info@...`).
fn unglue_encoded_spaces(text: &str) -> String {
    text.replace("%20", " ")
}

/// Rebuilds spelled-out addresses (`contact (at) school (dot) edu (dot) au`).
pub fn find_obfuscated_emails(text: &str) -> Vec<String> {
    OBFUSCATED_EMAIL_PATTERN
        .captures_iter(&unglue_encoded_spaces(text))
        .filter_map(|cap| {
            let separator = cap.get(2)?.as_str().trim_start();
            let raw_domain = cap.get(3)?.as_str();
            // A bare " at " followed by a dotted host is ordinary prose
            // ("find us at www.school.edu.au")
            let bracketed = separator.starts_with(['(', '[', '{']);
            if !bracketed && !OBFUSCATED_DOT_PATTERN.is_match(raw_domain) {
                return None;
            }
            let local = clean_candidate(cap.get(1)?.as_str());
            let domain = OBFUSCATED_DOT_PATTERN.replace_all(raw_domain, ".");
            (!local.is_empty()).then(|| format!("{local}@{domain}"))
        })
        .collect()
}

/// Finds plain `local@domain.tld` strings.
pub fn find_plain_emails(text: &str) -> Vec<String> {
    PLAIN_EMAIL_PATTERN
        .find_iter(&unglue_encoded_spaces(text))
        .map(|m| clean_candidate(m.as_str()))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Harvests candidates from every channel, keeping channels apart.
pub fn collect_candidates(document: &Html) -> CandidateSet {
    let mailto = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .flat_map(|href| parse_mailto(&strip_invisible(href)))
        .collect::<Vec<_>>();

    let text = strip_invisible(&visible_text(document));

    CandidateSet {
        mailto: dedupe_case_insensitive(mailto.into_iter()),
        obfuscated: dedupe_case_insensitive(find_obfuscated_emails(&text).into_iter()),
        text: dedupe_case_insensitive(find_plain_emails(&text).into_iter()),
        cloudflare: dedupe_case_insensitive(find_cloudflare_emails(document).into_iter()),
    }
}

/// Ordered, case-insensitively distinct email-like strings from a page.
///
/// # Examples
///
/// ```
/// use school_contacts::find_email_candidates;
///
/// let html = scraper::Html::parse_document(
///     r#"<a href="mailto:Info@School.edu.au?subject=Hi">Email</a>
///        <p>or write to info@school.edu.au</p>"#,
/// );
/// assert_eq!(find_email_candidates(&html), vec!["Info@School.edu.au"]);
/// ```
pub fn find_email_candidates(document: &Html) -> Vec<String> {
    collect_candidates(document).all()
}
