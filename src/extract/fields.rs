//! Core school fields from a single page.
//!
//! Composes the candidate finder, selector, contact-form locator and JSON-LD
//! parsing into one record fragment. Per field, the first non-empty value
//! wins; JSON-LD only fills what the page body left empty.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::candidates::collect_candidates;
use super::classify::EmailSource;
use super::contact_form::find_contact_form;
use super::select::{choose_general_email, choose_tiered_email};
use super::structured::extract_json_ld_contact;
use crate::config::ClassifierRules;
use crate::domain::{registrable_domain, website_host};
use crate::record::SchoolRecord;
use crate::utils::sanitize::strip_invisible;
use crate::utils::{compile_regex_unsafe, element_text, parse_selector_unsafe, visible_text};

static H1_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("h1", "H1_SELECTOR"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "ANCHOR_SELECTOR"));

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"(?:\+?61\s?|0)[2-9]\d(?:[\s-]?\d){7,8}", "PHONE_PATTERN")
});

static POSTCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"\b(\d{4})\b", "POSTCODE_PATTERN"));

/// Link targets that suggest a school's own website.
const WEBSITE_HINTS: &[&str] = &["school", "college", ".edu", ".nsw"];

/// Normalized fields extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreFields {
    /// First `<h1>` or JSON-LD `name`
    pub school_name: Option<String>,
    /// JSON-LD `address.addressLocality`
    pub suburb: Option<String>,
    /// First four-digit token, or JSON-LD `address.postalCode`
    pub postcode: Option<String>,
    /// First Australian phone number, or JSON-LD `telephone`
    pub phone: Option<String>,
    /// Best general email
    pub public_email: Option<String>,
    /// The school's own website when the page links to it
    pub website_url: Option<String>,
    /// Contact or enquiry form
    pub contact_form_url: Option<String>,
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    let empty = !slot.as_deref().is_some_and(|s| !s.trim().is_empty());
    if empty {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            *slot = Some(value.to_string());
        }
    }
}

fn first_non_empty(slot: &mut Option<String>, value: Option<String>) {
    fill(slot, &value);
}

impl CoreFields {
    /// Copies extracted values into `record` without overwriting anything the
    /// record already carries.
    pub fn fill_empty(&self, record: &mut SchoolRecord) {
        fill(&mut record.school_name, &self.school_name);
        fill(&mut record.suburb, &self.suburb);
        fill(&mut record.postcode, &self.postcode);
        fill(&mut record.phone, &self.phone);
        fill(&mut record.public_email, &self.public_email);
        fill(&mut record.website_url, &self.website_url);
        fill(&mut record.contact_form_url, &self.contact_form_url);
    }
}

/// First absolute link that looks like a school website on another domain.
fn find_website_link(document: &Html, page_url: &str, rules: &ClassifierRules) -> Option<String> {
    let own_domain = website_host(page_url).map(|host| registrable_domain(&host, rules));

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href").map(str::trim))
        .find(|href| {
            let lower = href.to_lowercase();
            let absolute = Url::parse(href)
                .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host());
            if !absolute || !WEBSITE_HINTS.iter().any(|hint| lower.contains(hint)) {
                return false;
            }
            let link_domain = website_host(href).map(|host| registrable_domain(&host, rules));
            link_domain.is_some() && link_domain != own_domain
        })
        .map(String::from)
}

/// Extracts the core school fields from one parsed page.
///
/// Email selection is tiered (mailto, then Cloudflare-decoded, then visible
/// text) with the discovered website as classification context.
pub fn extract_core_fields(document: &Html, page_url: &str, rules: &ClassifierRules) -> CoreFields {
    let mut fields = CoreFields {
        school_name: document
            .select(&H1_SELECTOR)
            .next()
            .map(|h1| element_text(&h1))
            .filter(|t| !t.is_empty()),
        ..Default::default()
    };

    let text = strip_invisible(&visible_text(document));

    fields.phone = PHONE_PATTERN.find(&text).map(|m| m.as_str().to_string());
    fields.website_url = find_website_link(document, page_url, rules);

    let candidates = collect_candidates(document);
    fields.public_email = choose_tiered_email(&candidates, fields.website_url.as_deref(), rules);

    fields.postcode = POSTCODE_PATTERN
        .captures(&text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string());

    let json_ld = extract_json_ld_contact(document);
    first_non_empty(&mut fields.school_name, json_ld.name);
    first_non_empty(&mut fields.phone, json_ld.telephone);
    first_non_empty(&mut fields.website_url, json_ld.url);
    if fields.public_email.is_none() {
        fields.public_email = choose_general_email(
            &json_ld.emails,
            fields.website_url.as_deref(),
            EmailSource::JsonLd,
            rules,
        );
    }
    first_non_empty(&mut fields.suburb, json_ld.locality);
    first_non_empty(&mut fields.postcode, json_ld.postal_code);

    fields.contact_form_url = find_contact_form(document, page_url);
    fields
}
