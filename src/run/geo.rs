//! Geocode, static export and search stages.

use anyhow::{Context, Result};
use serde::Serialize;

use super::save_to_database;
use crate::config::{ExportStaticArgs, GeocodeArgs, SearchArgs};
use crate::geo::{
    attach_coordinates, radius_search, resolve_location, Coordinate, PostcodeCentroids, SearchHit,
};
use crate::storage::{export_static_site, read_records_csv, write_records_csv, StaticExportSummary};

/// Attaches postcode centroids to every row; returns the number matched.
pub async fn run_geocode(args: &GeocodeArgs) -> Result<usize> {
    let centroids = PostcodeCentroids::from_geonames_path(&args.postcodes, args.state.as_deref())
        .context(format!("Failed to load postcodes from {}", args.postcodes.display()))?;
    let mut records = read_records_csv(&args.input)?;
    let matched = attach_coordinates(&mut records, &centroids);
    write_records_csv(&args.input, &records)?;
    save_to_database(args.db.as_deref(), &records).await?;
    Ok(matched)
}

/// Writes the static-site bundle from a geocoded dataset.
pub fn run_export_static(args: &ExportStaticArgs) -> Result<StaticExportSummary> {
    let records = read_records_csv(&args.input)?;
    export_static_site(&records, &args.out_dir)
}

/// A radius search answer, shaped for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Query as typed
    pub query: String,
    /// What the query resolved to
    pub resolved_location: String,
    pub center: Coordinate,
    pub radius_km: f64,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

/// Resolves the location and lists schools within the radius.
pub fn run_search(args: &SearchArgs) -> Result<SearchReport> {
    let records = read_records_csv(&args.input)?;
    let gazetteer = args
        .postcodes
        .as_deref()
        .map(|path| {
            PostcodeCentroids::from_geonames_path(path, args.state.as_deref())
                .context(format!("Failed to load postcodes from {}", path.display()))
        })
        .transpose()?;

    let resolved = resolve_location(&args.location, &records, gazetteer.as_ref())?;
    let results = radius_search(&records, resolved.center, args.radius_km, args.limit)?;

    Ok(SearchReport {
        query: args.location.clone(),
        resolved_location: resolved.label,
        center: resolved.center,
        radius_km: args.radius_km,
        count: results.len(),
        results,
    })
}
