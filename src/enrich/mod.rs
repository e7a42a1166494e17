//! Website enrichment.
//!
//! Fetches each eligible school's homepage (and, when needed, a handful of
//! likely contact pages) to fill a missing public email or contact-form URL.
//! Existing values are never overwritten. Every attempted row is marked
//! `website_checked` whatever the outcome so a campaign can be resumed from a
//! checkpoint without re-fetching.

mod client;
mod robots;

use chrono::NaiveDate;
use log::{debug, info, warn};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::config::{ClassifierRules, CONTACT_PAGE_PATHS, MAX_CONTACT_PAGE_CANDIDATES};
use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};
use crate::extract::{choose_tiered_email, collect_candidates, find_contact_form, resolve_url};
use crate::record::{ensure_http, SchoolRecord};
use crate::utils::{element_text, parse_selector_unsafe};

pub use client::{FetchFailure, FetchedPage, PoliteClient};
pub use robots::{RobotsCache, RobotsRules};

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "LINK_SELECTOR"));

/// Knobs for one enrichment campaign.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Maximum rows to attempt (0 = no limit)
    pub max_sites: usize,
    /// Invoke the checkpoint callback every N attempted rows (0 = never)
    pub checkpoint_every: usize,
    /// Stamped into `last_verified_date` of every attempted row
    pub run_date: NaiveDate,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            max_sites: 0,
            checkpoint_every: crate::config::DEFAULT_CHECKPOINT_EVERY,
            run_date: chrono::Local::now().date_naive(),
        }
    }
}

/// Result of enriching one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOutcome {
    /// Index of the row in the input slice
    pub index: usize,
    /// Normalized website that was fetched
    pub website_url: String,
    /// Whether the homepage was fetched
    pub success: bool,
    /// Why the homepage fetch failed
    pub error: Option<ErrorType>,
    /// The row's email was empty and is now set
    pub email_filled: bool,
    /// The row's contact form was empty and is now set
    pub contact_form_filled: bool,
    /// Pages fetched successfully, homepage included
    pub pages_fetched: usize,
}

/// Everything an enrichment run produced.
pub struct EnrichSummary {
    /// Rows that met the eligibility rules
    pub eligible: usize,
    /// Rows actually attempted (bounded by `max_sites`)
    pub attempted: usize,
    /// One outcome per attempted row, in row order
    pub outcomes: Vec<EnrichOutcome>,
    /// Aggregated counters
    pub stats: ProcessingStats,
}

impl EnrichSummary {
    /// Rows that gained an email.
    pub fn emails_filled(&self) -> usize {
        self.outcomes.iter().filter(|o| o.email_filled).count()
    }

    /// Rows that gained a contact form.
    pub fn contact_forms_filled(&self) -> usize {
        self.outcomes.iter().filter(|o| o.contact_form_filled).count()
    }

    /// Logs totals followed by the per-category counters.
    pub fn log_summary(&self) {
        let failed = self.outcomes.iter().filter(|o| !o.success).count();
        info!(
            "Enrichment: eligible={} attempted={} failed={} emails_filled={} forms_filled={}",
            self.eligible,
            self.attempted,
            failed,
            self.emails_filled(),
            self.contact_forms_filled()
        );
        self.stats.log_summary();
    }
}

/// What one parsed page offered.
#[derive(Debug, Default)]
struct PageFindings {
    email: Option<String>,
    contact_form: Option<String>,
    had_candidates: bool,
    contact_links: Vec<String>,
}

/// Parses a page and extracts everything enrichment needs from it.
///
/// The `Html` tree lives only inside this call so it never crosses an await.
fn analyse_page(
    page: &FetchedPage,
    website_url: &str,
    rules: &ClassifierRules,
    want_links: bool,
) -> PageFindings {
    let document = Html::parse_document(&page.body);
    let candidates = collect_candidates(&document);
    PageFindings {
        email: choose_tiered_email(&candidates, Some(website_url), rules),
        contact_form: find_contact_form(&document, page.url.as_str()),
        had_candidates: !candidates.is_empty(),
        contact_links: if want_links {
            contact_page_candidates(&document, &page.url)
        } else {
            Vec::new()
        },
    }
}

fn candidate_key(url: &str) -> String {
    url.to_lowercase().trim_end_matches('/').to_string()
}

/// Likely contact pages for a site: links whose target or label mentions
/// "contact", then the well-known paths, deduplicated case-insensitively
/// (ignoring a trailing slash) and capped at `MAX_CONTACT_PAGE_CANDIDATES`.
pub fn contact_page_candidates(document: &Html, page_url: &Url) -> Vec<String> {
    let discovered = document.select(&LINK_SELECTOR).filter_map(|anchor| {
        let href = anchor.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let label = element_text(&anchor).to_lowercase();
        if !href.to_lowercase().contains("contact") && !label.contains("contact") {
            return None;
        }
        resolve_url(Some(page_url), href)
    });
    let well_known = CONTACT_PAGE_PATHS
        .iter()
        .filter_map(|path| resolve_url(Some(page_url), path));

    let mut seen = HashSet::new();
    discovered
        .chain(well_known)
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string())
        .filter(|url| seen.insert(candidate_key(url)))
        .take(MAX_CONTACT_PAGE_CANDIDATES)
        .collect()
}

/// Rows worth fetching: a website, not yet checked, and a gap to fill.
fn eligible_website(record: &SchoolRecord) -> Option<String> {
    if record.website_checked || (record.has_email() && record.has_contact_form()) {
        return None;
    }
    record.website_url.as_deref().and_then(ensure_http)
}

/// Fetched values for one site, before merging into the row.
#[derive(Debug, Default)]
struct SiteFindings {
    email: Option<String>,
    contact_form: Option<String>,
    had_candidates: bool,
    pages_fetched: usize,
    error: Option<ErrorType>,
}

async fn enrich_site(
    client: &PoliteClient,
    website_url: &str,
    need_email: bool,
    need_form: bool,
    rules: &ClassifierRules,
    stats: &ProcessingStats,
) -> SiteFindings {
    let mut found = SiteFindings::default();

    let homepage = match client.fetch(website_url).await {
        Ok(page) => page,
        Err(failure) => {
            debug!("Homepage fetch failed for {}: {}", website_url, failure);
            found.error = Some(failure.error);
            return found;
        }
    };
    found.pages_fetched = 1;

    let home = analyse_page(&homepage, website_url, rules, true);
    found.email = home.email;
    found.contact_form = home.contact_form;
    found.had_candidates = home.had_candidates;

    let satisfied = |f: &SiteFindings| {
        (!need_email || f.email.is_some()) && (!need_form || f.contact_form.is_some())
    };

    for candidate in home.contact_links {
        if satisfied(&found) {
            break;
        }
        let page = match client.fetch(&candidate).await {
            Ok(page) => page,
            Err(failure) => {
                debug!("Contact page {} skipped: {}", candidate, failure);
                continue;
            }
        };
        found.pages_fetched += 1;
        stats.increment_info(InfoType::ContactPageFallback);

        let findings = analyse_page(&page, website_url, rules, false);
        found.had_candidates |= findings.had_candidates;
        if found.email.is_none() {
            found.email = findings.email;
        }
        if found.contact_form.is_none() {
            found.contact_form = findings.contact_form;
        }
    }

    found
}

/// Enriches eligible rows in place from their school websites.
///
/// Rows are attempted in order until `max_sites` is reached. `checkpoint`
/// receives the whole slice every `checkpoint_every` attempted rows; an error
/// from it aborts the run.
pub async fn enrich_records<F>(
    records: &mut [SchoolRecord],
    client: &PoliteClient,
    rules: &ClassifierRules,
    options: &EnrichOptions,
    mut checkpoint: F,
) -> anyhow::Result<EnrichSummary>
where
    F: FnMut(&[SchoolRecord]) -> anyhow::Result<()>,
{
    let stats = ProcessingStats::new();
    let mut outcomes = Vec::new();
    let mut eligible = 0;

    for index in 0..records.len() {
        let record = &records[index];
        if record.website_checked && record.website_url.is_some() {
            stats.increment_info(InfoType::AlreadyChecked);
        }
        let Some(website_url) = eligible_website(record) else {
            continue;
        };
        eligible += 1;
        if options.max_sites > 0 && outcomes.len() >= options.max_sites {
            continue;
        }

        let need_email = !record.has_email();
        let need_form = !record.has_contact_form();
        let found = enrich_site(client, &website_url, need_email, need_form, rules, &stats).await;

        let record = &mut records[index];
        let mut outcome = EnrichOutcome {
            index,
            website_url: website_url.clone(),
            success: found.error.is_none(),
            error: found.error,
            email_filled: false,
            contact_form_filled: false,
            pages_fetched: found.pages_fetched,
        };

        if let Some(error) = found.error {
            stats.increment_error(error);
        } else {
            if need_email {
                if let Some(email) = found.email {
                    record.public_email = Some(email);
                    outcome.email_filled = true;
                    stats.increment_info(InfoType::EmailFilled);
                } else if found.had_candidates {
                    stats.increment_warning(WarningType::NoValidCandidate);
                } else {
                    stats.increment_warning(WarningType::NoEmailFound);
                }
            }
            if need_form {
                if let Some(form) = found.contact_form {
                    record.contact_form_url = Some(form);
                    outcome.contact_form_filled = true;
                    stats.increment_info(InfoType::ContactFormFilled);
                } else {
                    stats.increment_warning(WarningType::NoContactFormFound);
                }
            }
        }

        record.website_checked = true;
        record.last_verified_date = Some(options.run_date);

        info!(
            "[{}] {} email={} form={}{}",
            outcomes.len() + 1,
            website_url,
            outcome.email_filled,
            outcome.contact_form_filled,
            outcome
                .error
                .map(|e| format!(" error={}", e))
                .unwrap_or_default()
        );
        outcomes.push(outcome);

        if options.checkpoint_every > 0 && outcomes.len() % options.checkpoint_every == 0 {
            checkpoint(&*records)?;
            info!("Checkpoint saved after {} attempted rows", outcomes.len());
        }
    }

    if options.max_sites > 0 && eligible > outcomes.len() {
        warn!(
            "Stopped after {} sites; {} eligible rows left for a later run",
            outcomes.len(),
            eligible - outcomes.len()
        );
    }

    Ok(EnrichSummary {
        eligible,
        attempted: outcomes.len(),
        outcomes,
        stats,
    })
}
