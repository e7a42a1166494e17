//! Static-site JSON bundle.
//!
//! Three compact files consumed by the browser search page: every school with
//! coordinates, the mean school coordinate per postcode, and per suburb.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::config::{STATIC_POSTCODE_CENTROIDS_FILE, STATIC_SCHOOLS_FILE, STATIC_SUBURB_CENTROIDS_FILE};
use crate::geo::{school_postcode_centroids, suburb_centroids};
use crate::record::{normalise_postcode, SchoolRecord};

/// One school as published to the static site. Absent text is an empty string.
#[derive(Debug, Serialize)]
struct StaticSchool<'a> {
    sector: &'static str,
    school_name: &'a str,
    suburb: &'a str,
    postcode: String,
    phone: &'a str,
    public_email: &'a str,
    contact_form_url: &'a str,
    website_url: &'a str,
    lat: f64,
    lon: f64,
}

impl<'a> StaticSchool<'a> {
    fn from_record(record: &'a SchoolRecord) -> Option<Self> {
        let (lat, lon) = record.coordinates()?;
        let text = |field: &'a Option<String>| field.as_deref().unwrap_or_default();
        Some(Self {
            sector: record.sector.as_str(),
            school_name: text(&record.school_name),
            suburb: text(&record.suburb),
            postcode: record
                .postcode
                .as_deref()
                .and_then(normalise_postcode)
                .unwrap_or_default(),
            phone: text(&record.phone),
            public_email: text(&record.public_email),
            contact_form_url: text(&record.contact_form_url),
            website_url: text(&record.website_url),
            lat,
            lon,
        })
    }
}

/// Counts from one static export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticExportSummary {
    pub schools: usize,
    pub postcodes: usize,
    pub suburbs: usize,
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string(value).context(format!("Failed to serialize {name}"))?;
    fs::write(&path, json).context(format!("Failed to write {}", path.display()))
}

/// Writes the static bundle into `out_dir`, creating it if needed.
///
/// Rows without coordinates are left out of every file.
pub fn export_static_site(records: &[SchoolRecord], out_dir: &Path) -> Result<StaticExportSummary> {
    fs::create_dir_all(out_dir)
        .context(format!("Failed to create directory: {}", out_dir.display()))?;

    let schools: Vec<StaticSchool<'_>> = records.iter().filter_map(StaticSchool::from_record).collect();
    let postcodes = school_postcode_centroids(records);
    let suburbs = suburb_centroids(records);

    write_json(out_dir, STATIC_SCHOOLS_FILE, &schools)?;
    write_json(out_dir, STATIC_POSTCODE_CENTROIDS_FILE, &postcodes)?;
    write_json(out_dir, STATIC_SUBURB_CENTROIDS_FILE, &suburbs)?;

    let summary = StaticExportSummary {
        schools: schools.len(),
        postcodes: postcodes.len(),
        suburbs: suburbs.len(),
    };
    info!(
        "Exported static data: {} schools, {} postcodes, {} suburbs",
        summary.schools, summary.postcodes, summary.suburbs
    );
    Ok(summary)
}
