//! Postcode gazetteer and centroid tables.
//!
//! The gazetteer is a GeoNames postal-code dump (the format pgeocode ships):
//! tab separated, no quoting, columns `country_code`, `postal_code`,
//! `place_name`, `admin_name1`, `admin_code1`, three more admin pairs, then
//! `latitude`, `longitude`, `accuracy`. A header row, if present, is skipped
//! because its latitude does not parse.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use super::types::{Coordinate, GazetteerEntry, GeoError, MeanAccumulator, SuburbCentroid};
use crate::record::{normalise_postcode, SchoolRecord};

const COL_POSTCODE: usize = 1;
const COL_PLACE_NAME: usize = 2;
const COL_STATE_CODE: usize = 4;
const COL_LATITUDE: usize = 9;
const COL_LONGITUDE: usize = 10;

/// Postcode centroids plus the place-name gazetteer they came from.
#[derive(Debug, Clone, Default)]
pub struct PostcodeCentroids {
    by_postcode: BTreeMap<String, Coordinate>,
    places: Vec<GazetteerEntry>,
}

impl PostcodeCentroids {
    /// Builds the table from gazetteer entries. Entries sharing a postcode
    /// are averaged into one centroid; every entry stays searchable by name.
    pub fn from_entries(places: Vec<GazetteerEntry>) -> Self {
        let mut sums: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
        for place in &places {
            sums.entry(place.postcode.clone())
                .or_default()
                .add(place.coordinate);
        }
        let by_postcode = sums
            .into_iter()
            .filter_map(|(postcode, acc)| acc.mean().map(|c| (postcode, c)))
            .collect();
        Self {
            by_postcode,
            places,
        }
    }

    /// Parses a GeoNames dump, optionally keeping one state only.
    pub fn from_geonames_reader<R: Read>(reader: R, state: Option<&str>) -> Result<Self, GeoError> {
        let state = state.map(|s| s.trim().to_uppercase());
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut places = Vec::new();
        let mut skipped = 0usize;
        for row in csv_reader.records() {
            let row = row?;
            match parse_entry(&row) {
                Some(entry) => {
                    if state.as_deref().is_some_and(|s| s != entry.state_code) {
                        continue;
                    }
                    places.push(entry);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("Skipped {} gazetteer rows without a usable postcode or coordinate", skipped);
        }

        let table = Self::from_entries(places);
        info!(
            "Loaded {} postcode centroids from {} gazetteer entries",
            table.len(),
            table.places.len()
        );
        Ok(table)
    }

    /// Opens and parses a GeoNames dump from disk.
    pub fn from_geonames_path(path: &Path, state: Option<&str>) -> Result<Self, GeoError> {
        let file = File::open(path)?;
        Self::from_geonames_reader(file, state)
    }

    /// Centroid for a postcode in any common spelling (`2000`, `2000.0`, ` 200`).
    pub fn get(&self, postcode: &str) -> Option<Coordinate> {
        let key = normalise_postcode(postcode)?;
        self.by_postcode.get(&key).copied()
    }

    /// First gazetteer entry whose place name contains `query`, case-insensitively.
    pub fn find_place(&self, query: &str) -> Option<&GazetteerEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.places
            .iter()
            .find(|place| place.place_name.to_lowercase().contains(&needle))
    }

    /// Number of distinct postcodes.
    pub fn len(&self) -> usize {
        self.by_postcode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_postcode.is_empty()
    }
}

fn parse_entry(row: &csv::StringRecord) -> Option<GazetteerEntry> {
    let postcode = normalise_postcode(row.get(COL_POSTCODE)?)?;
    let lat: f64 = row.get(COL_LATITUDE)?.trim().parse().ok()?;
    let lon: f64 = row.get(COL_LONGITUDE)?.trim().parse().ok()?;
    let coordinate = Coordinate::new(lat, lon);
    if !coordinate.is_valid() {
        return None;
    }
    Some(GazetteerEntry {
        postcode,
        place_name: row.get(COL_PLACE_NAME).unwrap_or_default().trim().to_string(),
        state_code: row
            .get(COL_STATE_CODE)
            .unwrap_or_default()
            .trim()
            .to_uppercase(),
        coordinate,
    })
}

/// Sets every row's `lat`/`lon` from its postcode centroid.
///
/// Rows whose postcode is missing or unknown get no coordinates. Returns the
/// number of rows matched.
pub fn attach_coordinates(records: &mut [SchoolRecord], centroids: &PostcodeCentroids) -> usize {
    let mut matched = 0;
    for record in records.iter_mut() {
        let point = record
            .postcode
            .as_deref()
            .and_then(|postcode| centroids.get(postcode));
        record.lat = point.map(|p| p.lat);
        record.lon = point.map(|p| p.lon);
        if point.is_some() {
            matched += 1;
        }
    }
    info!(
        "Geocoded {}/{} rows from postcode centroids",
        matched,
        records.len()
    );
    matched
}

/// Mean school coordinate per normalized postcode.
pub fn school_postcode_centroids(records: &[SchoolRecord]) -> BTreeMap<String, Coordinate> {
    let mut sums: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
    for record in records {
        let (Some((lat, lon)), Some(postcode)) = (
            record.coordinates(),
            record.postcode.as_deref().and_then(normalise_postcode),
        ) else {
            continue;
        };
        sums.entry(postcode).or_default().add(Coordinate::new(lat, lon));
    }
    sums.into_iter()
        .filter_map(|(postcode, acc)| acc.mean().map(|c| (postcode, c)))
        .collect()
}

/// Mean school coordinate per suburb (trimmed, as written), sorted by suburb.
pub fn suburb_centroids(records: &[SchoolRecord]) -> Vec<SuburbCentroid> {
    let mut sums: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
    for record in records {
        let Some((lat, lon)) = record.coordinates() else {
            continue;
        };
        let suburb = record.suburb.as_deref().map(str::trim).unwrap_or_default();
        if suburb.is_empty() {
            continue;
        }
        sums.entry(suburb.to_string())
            .or_default()
            .add(Coordinate::new(lat, lon));
    }
    sums.into_iter()
        .filter_map(|(suburb, acc)| {
            acc.mean().map(|c| SuburbCentroid {
                suburb,
                lat: c.lat,
                lon: c.lon,
            })
        })
        .collect()
}
