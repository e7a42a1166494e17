//! Email audit over stored records.
//!
//! Every row's `public_email` is re-classified with mixed provenance against
//! the row's own website. Only valid addresses survive; the disposition and
//! reason are stored on the row for later review.

use std::collections::BTreeMap;

use log::info;

use crate::config::ClassifierRules;
use crate::extract::{classify_email, Disposition, EmailSource};
use crate::record::SchoolRecord;

/// Counts from one audit pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Rows examined
    pub rows: usize,
    /// Rows carrying an email before the audit
    pub emails_before: usize,
    /// Rows carrying an email after the audit
    pub emails_after: usize,
    /// Rows classified valid
    pub valid: usize,
    /// Rows classified suspicious (email cleared)
    pub suspicious: usize,
    /// Rows classified invalid, including rows without an email
    pub invalid: usize,
    /// Rows per reason code
    pub by_reason: BTreeMap<String, usize>,
    /// Rows whose `website_checked` flag was reset
    pub rechecks_queued: usize,
}

impl AuditReport {
    /// Logs the report at info level.
    pub fn log_summary(&self, label: &str) {
        info!(
            "[{}] rows={} emails_before={} emails_after={} valid={} suspicious={} invalid={}",
            label,
            self.rows,
            self.emails_before,
            self.emails_after,
            self.valid,
            self.suspicious,
            self.invalid
        );
        for (reason, count) in &self.by_reason {
            info!("[{}]   {}: {}", label, reason, count);
        }
        if self.rechecks_queued > 0 {
            info!(
                "[{}] {} rows queued for website re-check",
                label, self.rechecks_queued
            );
        }
    }
}

/// Audits every row's email in place.
///
/// Valid addresses are kept in normalized form; anything else is cleared.
/// Clearing a non-empty email resets `website_checked` so the next enrichment
/// campaign fetches the site again.
pub fn audit_emails(records: &mut [SchoolRecord], rules: &ClassifierRules) -> AuditReport {
    let mut report = AuditReport {
        rows: records.len(),
        ..Default::default()
    };

    for record in records.iter_mut() {
        let had_email = record.has_email();
        if had_email {
            report.emails_before += 1;
        }

        let result = classify_email(
            record.public_email.as_deref().unwrap_or_default(),
            record.website_url.as_deref(),
            EmailSource::Mixed,
            rules,
        );

        match result.disposition {
            Disposition::Valid => report.valid += 1,
            Disposition::Suspicious => report.suspicious += 1,
            Disposition::Invalid => report.invalid += 1,
        }
        *report
            .by_reason
            .entry(result.reason.as_str().to_string())
            .or_default() += 1;

        record.email_validation_status = Some(result.disposition.as_str().to_string());
        record.email_validation_reason = Some(result.reason.as_str().to_string());
        record.public_email = if result.is_valid() { result.email } else { None };

        if record.has_email() {
            report.emails_after += 1;
        } else if had_email {
            record.website_checked = false;
            report.rechecks_queued += 1;
        }
    }

    report
}
