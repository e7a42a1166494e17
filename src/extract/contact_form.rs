//! Contact-form URL discovery.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::utils::{element_text, parse_selector_unsafe};

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("form", "FORM_SELECTOR"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "ANCHOR_SELECTOR"));

/// Link schemes that never lead to a form.
const NON_FORM_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:"];

/// Resolves `target` against `base`, accepting already-absolute targets when
/// the base itself does not parse.
pub(crate) fn resolve_url(base: Option<&Url>, target: &str) -> Option<Url> {
    match base {
        Some(base) => base.join(target).ok(),
        None => Url::parse(target).ok(),
    }
}

/// Finds a best-effort contact or enquiry URL on a page.
///
/// The first `<form>` wins: its `action` resolved against `base_url`, or the
/// page itself when the action is missing or empty. Without a usable form,
/// the first anchor whose target or label mentions "contact" is used.
pub fn find_contact_form(document: &Html, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url.trim()).ok();

    if let Some(form) = document.select(&FORM_SELECTOR).next() {
        let action = form.value().attr("action").map(str::trim).unwrap_or_default();
        let resolved = if action.is_empty() {
            base.clone()
        } else {
            resolve_url(base.as_ref(), action)
        };
        if let Some(url) = resolved {
            return Some(url.to_string());
        }
    }

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let href_lower = href.to_lowercase();
        if href.is_empty() || NON_FORM_SCHEMES.iter().any(|s| href_lower.starts_with(s)) {
            continue;
        }

        let label = element_text(&anchor).to_lowercase();
        if !href_lower.contains("contact") && !label.contains("contact") {
            continue;
        }
        if let Some(url) = resolve_url(base.as_ref(), href) {
            return Some(url.to_string());
        }
    }

    None
}
