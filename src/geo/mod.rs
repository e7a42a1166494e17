//! Postcode geocoding and radius search.
//!
//! This module provides:
//! - A postcode centroid table loaded from a GeoNames postal-code dump
//! - Attaching centroid coordinates to records
//! - Per-postcode and per-suburb school centroids for the static export
//! - Location resolution and haversine radius search

mod centroids;
mod search;
mod types;

pub use centroids::{
    attach_coordinates, school_postcode_centroids, suburb_centroids, PostcodeCentroids,
};
pub use search::{haversine_km, radius_search, resolve_location};
pub use types::{Coordinate, GazetteerEntry, GeoError, ResolvedLocation, SearchHit, SuburbCentroid};
