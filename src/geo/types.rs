//! Geolocation data structures.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::record::SchoolRecord;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components finite and inside the valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// One postal-code entry of the gazetteer.
#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerEntry {
    pub postcode: String,
    pub place_name: String,
    /// Upper-cased state code (e.g. `NSW`)
    pub state_code: String,
    pub coordinate: Coordinate,
}

/// Errors from the geolocation layer.
#[derive(Error, Debug)]
pub enum GeoError {
    /// Reading the gazetteer failed.
    #[error("Gazetteer I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The gazetteer is not valid tab-separated data.
    #[error("Gazetteer parse error: {0}")]
    Csv(#[from] csv::Error),

    /// An empty location query.
    #[error("Location query is required")]
    EmptyQuery,

    /// Nothing matched the query.
    #[error("Could not resolve location '{0}'")]
    Unresolved(String),

    /// Radius must be a positive finite number of kilometres.
    #[error("radius_km must be greater than 0 (got {0})")]
    InvalidRadius(f64),
}

/// A resolved search center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    /// Human-readable description of what matched
    pub label: String,
    pub center: Coordinate,
}

fn round_km<S: Serializer>(distance: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((distance * 100.0).round() / 100.0)
}

/// A school within the search radius.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: SchoolRecord,
    /// Great-circle distance from the center, serialized to two decimals
    #[serde(serialize_with = "round_km")]
    pub distance_km: f64,
}

/// Mean coordinate of one suburb's schools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuburbCentroid {
    pub suburb: String,
    pub lat: f64,
    pub lon: f64,
}

/// Running mean of coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeanAccumulator {
    lat: f64,
    lon: f64,
    count: usize,
}

impl MeanAccumulator {
    pub(crate) fn add(&mut self, point: Coordinate) {
        self.lat += point.lat;
        self.lon += point.lon;
        self.count += 1;
    }

    pub(crate) fn mean(&self) -> Option<Coordinate> {
        (self.count > 0).then(|| {
            Coordinate::new(self.lat / self.count as f64, self.lon / self.count as f64)
        })
    }
}
