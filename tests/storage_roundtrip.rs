//! Dataset persistence through CSV files, SQLite and the static bundle.

mod helpers;

use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use helpers::school;
use school_contacts::config::{
    STATIC_POSTCODE_CENTROIDS_FILE, STATIC_SCHOOLS_FILE, STATIC_SUBURB_CENTROIDS_FILE,
};
use school_contacts::{
    export_static_site, load_sqlite, open_database, read_records_csv, save_sqlite,
    write_records_csv, SchoolRecord, Sector,
};

fn dataset() -> Vec<SchoolRecord> {
    let mut hill = school("Hill School", "Hobart", "7000", Some("info@hill.edu.au"));
    hill.phone = Some("03 6234 1234".to_string());
    hill.website_url = Some("https://hill.edu.au".to_string());
    hill.last_verified_date = NaiveDate::from_ymd_opt(2025, 2, 14);
    hill.lat = Some(-42.8826);
    hill.lon = Some(147.3257);
    hill.website_checked = true;
    hill.email_validation_status = Some("valid".to_string());
    hill.email_validation_reason = Some("general_prefix".to_string());

    let mut bay = school("Bay College, Senior Campus", "Launceston", "7250", None);
    bay.sector = Sector::Catholic;
    bay.contact_form_url = Some("https://bay.catholic.edu.au/enquire?type=\"tour\"".to_string());

    vec![hill, bay, SchoolRecord::default()]
}

#[test]
fn test_csv_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("schools.csv");
    let records = dataset();

    write_records_csv(&path, &records).unwrap();
    assert!(!path.with_extension("csv.tmp").exists());
    let back = read_records_csv(&path).unwrap();
    assert_eq!(back, records);
}

#[test]
fn test_csv_rewrite_replaces_previous_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schools.csv");

    write_records_csv(&path, &dataset()).unwrap();
    write_records_csv(&path, &dataset()[..1]).unwrap();
    assert_eq!(read_records_csv(&path).unwrap().len(), 1);
}

#[test]
fn test_read_missing_csv_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.csv");
    let err = read_records_csv(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.csv"));
}

#[tokio::test]
async fn test_sqlite_file_roundtrip_and_replace() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schools.db");
    let records = dataset();

    let pool = open_database(&path).await.unwrap();
    assert_eq!(save_sqlite(&pool, &records).await.unwrap(), 3);
    assert_eq!(load_sqlite(&pool).await.unwrap(), records);

    // Saving again replaces the table instead of appending
    save_sqlite(&pool, &records[..1]).await.unwrap();
    pool.close().await;

    let reopened = open_database(&path).await.unwrap();
    let rows = load_sqlite(&reopened).await.unwrap();
    assert_eq!(rows, records[..1].to_vec());
    reopened.close().await;
}

#[test]
fn test_static_export_files() {
    let dir = TempDir::new().unwrap();
    let mut records = dataset();
    let mut north = school("North Primary", "Hobart", "7000", None);
    north.lat = Some(-42.8722);
    north.lon = Some(147.3169);
    records.push(north);

    let summary = export_static_site(&records, dir.path()).unwrap();
    assert_eq!(summary.schools, 2);
    assert_eq!(summary.postcodes, 1);
    assert_eq!(summary.suburbs, 1);

    let schools: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(STATIC_SCHOOLS_FILE)).unwrap())
            .unwrap();
    let schools = schools.as_array().unwrap();
    assert_eq!(schools.len(), 2);
    assert_eq!(schools[0]["school_name"], "Hill School");
    assert_eq!(schools[1]["public_email"], "");

    let postcodes: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join(STATIC_POSTCODE_CENTROIDS_FILE)).unwrap(),
    )
    .unwrap();
    let lat = postcodes["7000"]["lat"].as_f64().unwrap();
    assert!((lat - (-42.8826 - 42.8722) / 2.0).abs() < 1e-9);

    let suburbs = fs::read_to_string(dir.path().join(STATIC_SUBURB_CENTROIDS_FILE)).unwrap();
    assert!(suburbs.contains("\"Hobart\""));
}
