//! Per-sector coverage summary.

use strum::IntoEnumIterator;

use super::{SchoolRecord, Sector};

/// Email and contact-form coverage for one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorSummary {
    /// Sector summarized
    pub sector: Sector,
    /// Rows in the sector
    pub total: usize,
    /// Rows with an email
    pub with_email: usize,
    /// Rows with a contact form but no email
    pub contact_form_only: usize,
}

impl SectorSummary {
    fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            part as f64 * 100.0 / total as f64
        }
    }

    /// Share of rows with an email, in percent.
    pub fn email_pct(&self) -> f64 {
        Self::pct(self.with_email, self.total)
    }

    /// Share of rows reachable only through a contact form, in percent.
    pub fn contact_form_only_pct(&self) -> f64 {
        Self::pct(self.contact_form_only, self.total)
    }
}

/// Summarizes coverage per sector, skipping sectors without rows.
pub fn sector_summary(records: &[SchoolRecord]) -> Vec<SectorSummary> {
    Sector::iter()
        .filter_map(|sector| {
            let rows: Vec<&SchoolRecord> = records.iter().filter(|r| r.sector == sector).collect();
            if rows.is_empty() {
                return None;
            }
            Some(SectorSummary {
                sector,
                total: rows.len(),
                with_email: rows.iter().filter(|r| r.has_email()).count(),
                contact_form_only: rows
                    .iter()
                    .filter(|r| !r.has_email() && r.has_contact_form())
                    .count(),
            })
        })
        .collect()
}
