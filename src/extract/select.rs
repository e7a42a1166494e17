//! General-mailbox selection.

use std::sync::LazyLock;

use regex::Regex;

use super::candidates::CandidateSet;
use super::classify::{classify_email, EmailSource};
use crate::config::ClassifierRules;
use crate::utils::compile_regex_unsafe;

/// `firstname.lastname` local parts belong to people, not the office.
static PERSONAL_LOCAL_PART: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"^[a-z]{3,}\.[a-z]{3,}$", "PERSONAL_LOCAL_PART"));

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or_default()
}

/// Picks the best general-purpose address among `candidates`.
///
/// Only candidates classified valid are considered (suspicious ones never
/// win). Preference, each in original order: a local part starting with a
/// general prefix (`info`, `office`, ...), then one that does not look like
/// `firstname.lastname`, then the first valid address.
///
/// # Examples
///
/// ```
/// use school_contacts::{choose_general_email, ClassifierRules, EmailSource};
///
/// let rules = ClassifierRules::default();
/// let picked = choose_general_email(
///     &["john.smith@school.edu.au", "info@school.edu.au"],
///     None,
///     EmailSource::Text,
///     &rules,
/// );
/// assert_eq!(picked.as_deref(), Some("info@school.edu.au"));
/// ```
pub fn choose_general_email<S: AsRef<str>>(
    candidates: &[S],
    website_url: Option<&str>,
    source: EmailSource,
    rules: &ClassifierRules,
) -> Option<String> {
    let valid: Vec<String> = candidates
        .iter()
        .map(|c| classify_email(c.as_ref(), website_url, source, rules))
        .filter(|result| result.is_valid())
        .filter_map(|result| result.email)
        .collect();

    let general = valid.iter().find(|email| {
        let local = local_part(email);
        rules
            .general_prefixes
            .iter()
            .any(|prefix| local.starts_with(prefix.as_str()))
    });
    if let Some(email) = general {
        return Some(email.clone());
    }

    valid
        .iter()
        .find(|email| !PERSONAL_LOCAL_PART.is_match(local_part(email)))
        .or_else(|| valid.first())
        .cloned()
}

/// Tiered selection over a page's candidate channels: mailto anchors first,
/// then Cloudflare-decoded addresses, then visible text. Each tier carries
/// its own provenance into classification.
pub fn choose_tiered_email(
    candidates: &CandidateSet,
    website_url: Option<&str>,
    rules: &ClassifierRules,
) -> Option<String> {
    choose_general_email(&candidates.mailto, website_url, EmailSource::Mailto, rules)
        .or_else(|| {
            choose_general_email(
                &candidates.cloudflare,
                website_url,
                EmailSource::Cloudflare,
                rules,
            )
        })
        .or_else(|| {
            choose_general_email(
                &candidates.text_channel(),
                website_url,
                EmailSource::Text,
                rules,
            )
        })
}
