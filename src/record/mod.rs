//! School contact records.
//!
//! This module provides:
//! - `SchoolRecord`, the canonical row shared by CSV, SQLite and the enricher
//! - `Sector` with prefix-based label mapping
//! - Row standardization and deduplication
//! - Per-sector coverage summaries

mod clean;
mod normalize;
mod summary;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::EnumIter as EnumIterMacro;

pub use clean::{deduplicate, standardize};
pub use normalize::{clean_str, ensure_http, norm_key, normalise_postcode, normalize_phone, title_case};
pub use summary::{sector_summary, SectorSummary};

/// School sector.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, EnumIterMacro,
)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    /// Government (public) schools
    Government,
    /// Independent schools
    Independent,
    /// Catholic systemic schools
    Catholic,
    /// Anything the label mapping does not recognize
    #[default]
    Unknown,
}

impl Sector {
    /// Maps an ingested label by prefix: `gov*`, `cath*`, `ind*`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.starts_with("gov") {
            Sector::Government
        } else if label.starts_with("cath") {
            Sector::Catholic
        } else if label.starts_with("ind") {
            Sector::Independent
        } else {
            Sector::Unknown
        }
    }

    /// Lowercase label used in CSV, SQLite and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Government => "government",
            Sector::Independent => "independent",
            Sector::Catholic => "catholic",
            Sector::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(Sector::from_label).unwrap_or_default())
    }
}

/// One school's contact details.
///
/// Optional fields are `None` when absent; ingestion treats empty strings and
/// `nan` as absent. Missing CSV columns deserialize to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolRecord {
    /// School sector
    pub sector: Sector,
    /// School name, casing preserved
    pub school_name: Option<String>,
    /// Suburb, title-cased on standardization
    pub suburb: Option<String>,
    /// Four-digit postcode
    pub postcode: Option<String>,
    /// Phone number as published
    pub phone: Option<String>,
    /// General contact email, lowercase and grammar-checked
    pub public_email: Option<String>,
    /// Absolute contact or enquiry form URL
    pub contact_form_url: Option<String>,
    /// Absolute website URL
    pub website_url: Option<String>,
    /// Directory page the row was harvested from
    pub source_directory_url: Option<String>,
    /// Date of the run that last produced or touched the row
    #[serde(deserialize_with = "lenient_date")]
    pub last_verified_date: Option<NaiveDate>,
    /// Latitude of the postcode centroid
    #[serde(deserialize_with = "lenient_float")]
    pub lat: Option<f64>,
    /// Longitude of the postcode centroid
    #[serde(deserialize_with = "lenient_float")]
    pub lon: Option<f64>,
    /// Disposition from the last email audit
    pub email_validation_status: Option<String>,
    /// Reason code from the last email audit
    pub email_validation_reason: Option<String>,
    /// Whether the website was fetched in the current enrichment campaign
    #[serde(deserialize_with = "lenient_flag")]
    pub website_checked: bool,
}

impl SchoolRecord {
    /// Applies the ingestion rules to every text field: trimmed, with empty
    /// strings and `nan` collapsed to `None`.
    pub fn clean_text_fields(&mut self) {
        for field in [
            &mut self.school_name,
            &mut self.suburb,
            &mut self.postcode,
            &mut self.phone,
            &mut self.public_email,
            &mut self.contact_form_url,
            &mut self.website_url,
            &mut self.source_directory_url,
            &mut self.email_validation_status,
            &mut self.email_validation_reason,
        ] {
            normalize::clean_field(field);
        }
    }

    /// True when the row carries a non-empty email.
    pub fn has_email(&self) -> bool {
        self.public_email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// True when the row carries a non-empty contact form URL.
    pub fn has_contact_form(&self) -> bool {
        self.contact_form_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }

    /// Both coordinates, when present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }
}

/// A CSV, JSON or SQLite scalar before it is given a field type.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawScalar {
    fn into_text(self) -> Option<String> {
        match self {
            RawScalar::Bool(b) => Some(b.to_string()),
            RawScalar::Number(n) => Some(n.to_string()),
            RawScalar::Text(s) => clean_str(Some(&s)),
        }
    }
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<RawScalar>::deserialize(deserializer)?;
    Ok(raw.and_then(RawScalar::into_text).and_then(|s| {
        let date_part = s.get(..10).unwrap_or(&s);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }))
}

fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<RawScalar>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawScalar::Number(n)) => Some(n),
        other => other
            .and_then(RawScalar::into_text)
            .and_then(|s| s.parse::<f64>().ok()),
    }
    .filter(|v| v.is_finite()))
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<RawScalar>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawScalar::Bool(b)) => b,
        Some(RawScalar::Number(n)) => n == 1.0,
        other => matches!(
            other.and_then(RawScalar::into_text).map(|s| s.to_lowercase()).as_deref(),
            Some("true" | "1" | "yes" | "y" | "t")
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_from_label() {
        assert_eq!(Sector::from_label("Government"), Sector::Government);
        assert_eq!(Sector::from_label(" gov "), Sector::Government);
        assert_eq!(Sector::from_label("Catholic Education"), Sector::Catholic);
        assert_eq!(Sector::from_label("Independent"), Sector::Independent);
        assert_eq!(Sector::from_label("other"), Sector::Unknown);
        assert_eq!(Sector::from_label(""), Sector::Unknown);
    }

    #[test]
    fn test_sector_serde() {
        assert_eq!(serde_json::to_string(&Sector::Catholic).unwrap(), "\"catholic\"");
        let sector: Sector = serde_json::from_str("\"INDEPENDENT schools\"").unwrap();
        assert_eq!(sector, Sector::Independent);
        let sector: Sector = serde_json::from_str("null").unwrap();
        assert_eq!(sector, Sector::Unknown);
    }

    #[test]
    fn test_clean_text_fields() {
        let mut record = SchoolRecord {
            school_name: Some("  Hill School ".into()),
            suburb: Some("nan".into()),
            phone: Some("   ".into()),
            ..Default::default()
        };
        record.clean_text_fields();
        assert_eq!(record.school_name.as_deref(), Some("Hill School"));
        assert_eq!(record.suburb, None);
        assert_eq!(record.phone, None);
    }

    #[test]
    fn test_lenient_fields_from_json() {
        let record: SchoolRecord = serde_json::from_str(
            r#"{"sector": "gov", "lat": "-37.8", "lon": "nan",
                "last_verified_date": "2024-05-01T00:00:00", "website_checked": "True"}"#,
        )
        .unwrap();
        assert_eq!(record.sector, Sector::Government);
        assert_eq!(record.lat, Some(-37.8));
        assert_eq!(record.lon, None);
        assert_eq!(
            record.last_verified_date,
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert!(record.website_checked);
        assert_eq!(record.coordinates(), None);

        let record: SchoolRecord =
            serde_json::from_str(r#"{"lat": -31.95, "lon": 115.86, "website_checked": false}"#)
                .unwrap();
        assert_eq!(record.coordinates(), Some((-31.95, 115.86)));
        assert!(!record.website_checked);
    }

    #[test]
    fn test_has_email_and_form() {
        let record = SchoolRecord {
            public_email: Some("info@school.edu.au".into()),
            ..Default::default()
        };
        assert!(record.has_email());
        assert!(!record.has_contact_form());
    }
}
