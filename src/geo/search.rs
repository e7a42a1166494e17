//! Location resolution and radius search.

use std::sync::LazyLock;

use regex::Regex;

use super::centroids::PostcodeCentroids;
use super::types::{Coordinate, GeoError, MeanAccumulator, ResolvedLocation, SearchHit};
use crate::config::{EARTH_RADIUS_KM, MAX_SEARCH_LIMIT};
use crate::record::{title_case, SchoolRecord};
use crate::utils::compile_regex_unsafe;

static POSTCODE_QUERY: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"^\d{4}$", "POSTCODE_QUERY"));

/// Great-circle distance in kilometres.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let dlat = (to.lat - from.lat).to_radians();
    let dlon = (to.lon - from.lon).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Resolves a free-text location to a search center.
///
/// Tried in order: a four-digit postcode against the gazetteer, an exact
/// (case-insensitive) suburb of the loaded schools averaged over their
/// coordinates, then the first gazetteer place name containing the query.
/// Without a gazetteer, a postcode falls back to the mean of the schools
/// carrying it.
pub fn resolve_location(
    query: &str,
    records: &[SchoolRecord],
    gazetteer: Option<&PostcodeCentroids>,
) -> Result<ResolvedLocation, GeoError> {
    let text = query.trim();
    if text.is_empty() {
        return Err(GeoError::EmptyQuery);
    }

    if POSTCODE_QUERY.is_match(text) {
        let center = match gazetteer {
            Some(table) => table.get(text),
            None => mean_of(records, |r| r.postcode.as_deref().map(str::trim) == Some(text)),
        };
        return center
            .map(|center| ResolvedLocation {
                label: format!("Postcode {text}"),
                center,
            })
            .ok_or_else(|| GeoError::Unresolved(text.to_string()));
    }

    let key = text.to_lowercase();
    let suburb_center = mean_of(records, |r| {
        r.suburb
            .as_deref()
            .is_some_and(|s| s.trim().to_lowercase() == key)
    });
    if let Some(center) = suburb_center {
        return Ok(ResolvedLocation {
            label: format!("Suburb {}", title_case(text)),
            center,
        });
    }

    gazetteer
        .and_then(|table| table.find_place(text))
        .map(|place| ResolvedLocation {
            label: place.place_name.clone(),
            center: place.coordinate,
        })
        .ok_or_else(|| GeoError::Unresolved(text.to_string()))
}

fn mean_of<F>(records: &[SchoolRecord], predicate: F) -> Option<Coordinate>
where
    F: Fn(&SchoolRecord) -> bool,
{
    let mut acc = MeanAccumulator::default();
    for record in records.iter().filter(|r| predicate(r)) {
        if let Some((lat, lon)) = record.coordinates() {
            acc.add(Coordinate::new(lat, lon));
        }
    }
    acc.mean()
}

/// Schools within `radius_km` of `center`, nearest first.
///
/// Rows without coordinates are ignored. `limit` is clamped to
/// `1..=MAX_SEARCH_LIMIT`; equal distances keep input order.
pub fn radius_search(
    records: &[SchoolRecord],
    center: Coordinate,
    radius_km: f64,
    limit: usize,
) -> Result<Vec<SearchHit>, GeoError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GeoError::InvalidRadius(radius_km));
    }

    let mut within: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let (lat, lon) = record.coordinates()?;
            let distance_km = haversine_km(center, Coordinate::new(lat, lon));
            (distance_km <= radius_km).then_some((index, distance_km))
        })
        .collect();

    within.sort_by(|a, b| a.1.total_cmp(&b.1));
    within.truncate(limit.clamp(1, MAX_SEARCH_LIMIT));
    Ok(within
        .into_iter()
        .map(|(index, distance_km)| SearchHit {
            record: records[index].clone(),
            distance_km,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::types::GazetteerEntry;

    const SYDNEY: Coordinate = Coordinate {
        lat: -33.8688,
        lon: 151.2093,
    };

    fn school(name: &str, suburb: &str, postcode: &str, lat: f64, lon: f64) -> SchoolRecord {
        SchoolRecord {
            school_name: Some(name.to_string()),
            suburb: Some(suburb.to_string()),
            postcode: Some(postcode.to_string()),
            lat: Some(lat),
            lon: Some(lon),
            ..Default::default()
        }
    }

    fn gazetteer() -> PostcodeCentroids {
        PostcodeCentroids::from_entries(vec![
            GazetteerEntry {
                postcode: "2000".to_string(),
                place_name: "Sydney".to_string(),
                state_code: "NSW".to_string(),
                coordinate: SYDNEY,
            },
            GazetteerEntry {
                postcode: "2300".to_string(),
                place_name: "Newcastle West".to_string(),
                state_code: "NSW".to_string(),
                coordinate: Coordinate::new(-32.9267, 151.7647),
            },
        ])
    }

    fn schools() -> Vec<SchoolRecord> {
        vec![
            school("Harbour PS", "Sydney", "2000", -33.87, 151.21),
            school("Hills HS", "Parramatta", "2150", -33.815, 151.0),
            school("Coast PS", "Parramatta", "2150", -33.825, 151.01),
            school("Far HS", "Newcastle", "2300", -32.93, 151.78),
            SchoolRecord {
                school_name: Some("Unplaced".to_string()),
                suburb: Some("Sydney".to_string()),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_haversine_known_distance() {
        let melbourne = Coordinate::new(-37.8136, 144.9631);
        let d = haversine_km(SYDNEY, melbourne);
        assert!((d - 713.4).abs() < 2.0, "got {d}");
        assert_eq!(haversine_km(SYDNEY, SYDNEY), 0.0);
    }

    #[test]
    fn test_resolve_postcode() {
        let table = gazetteer();
        let resolved = resolve_location(" 2000 ", &schools(), Some(&table)).unwrap();
        assert_eq!(resolved.label, "Postcode 2000");
        assert_eq!(resolved.center, SYDNEY);

        let err = resolve_location("9999", &schools(), Some(&table)).unwrap_err();
        assert!(matches!(err, GeoError::Unresolved(q) if q == "9999"));
    }

    #[test]
    fn test_resolve_postcode_without_gazetteer_uses_schools() {
        let resolved = resolve_location("2150", &schools(), None).unwrap();
        assert!((resolved.center.lat - -33.82).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_suburb_before_gazetteer() {
        let table = gazetteer();
        let resolved = resolve_location("parramatta", &schools(), Some(&table)).unwrap();
        assert_eq!(resolved.label, "Suburb Parramatta");
        assert!((resolved.center.lon - 151.005).abs() < 1e-9);

        // "Newcastle" is an exact suburb, "newcastle w" only a gazetteer substring
        let resolved = resolve_location("newcastle w", &schools(), Some(&table)).unwrap();
        assert_eq!(resolved.label, "Newcastle West");
    }

    #[test]
    fn test_resolve_failures() {
        assert!(matches!(
            resolve_location("  ", &schools(), None),
            Err(GeoError::EmptyQuery)
        ));
        assert!(matches!(
            resolve_location("Atlantis", &schools(), Some(&gazetteer())),
            Err(GeoError::Unresolved(_))
        ));
    }

    #[test]
    fn test_radius_search_sorted_and_limited() {
        let records = schools();
        let hits = radius_search(&records, SYDNEY, 30.0, 10).unwrap();
        let names: Vec<_> = hits
            .iter()
            .map(|h| h.record.school_name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["Harbour PS", "Coast PS", "Hills HS"]);
        assert!(hits.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

        let hits = radius_search(&records, SYDNEY, 500.0, 2).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_radius_search_rejects_bad_radius() {
        for radius in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                radius_search(&schools(), SYDNEY, radius, 10),
                Err(GeoError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn test_search_hit_serializes_flat_with_rounded_distance() {
        let record = school("Harbour PS", "Sydney", "2000", -33.87, 151.21);
        let hit = SearchHit {
            record,
            distance_km: 1.23456,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["school_name"], "Harbour PS");
        assert_eq!(json["distance_km"], 1.23);
    }
}
