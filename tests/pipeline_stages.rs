//! Stage runners over files on disk: merge, audit, geocode, export and search.

mod helpers;

use chrono::NaiveDate;
use tempfile::TempDir;

use helpers::{write_fixture, GAZETTEER};
use school_contacts::config::{
    AuditArgs, ExportStaticArgs, GeocodeArgs, MergeArgs, SearchArgs, DEFAULT_SEARCH_LIMIT,
};
use school_contacts::run::{
    run_audit, run_export_static, run_geocode, run_merge, run_search,
};
use school_contacts::{
    load_sqlite, open_database, read_records_csv, ClassifierRules, Sector,
};

const GOVERNMENT_CSV: &str = "\
sector,school_name,suburb,postcode,phone,public_email,website_url
Government,Hill School,HOBART,7000.0,03  6234 1234,,https://hill.tas.edu.au
Government,  Hill School ,Hobart,7000,,Office@Hill.tas.edu.au,https://hill.tas.edu.au
Government,Ridge Primary,North Hobart,7000,,not-an-email,
";

const CATHOLIC_CSV: &str = "\
sector,school_name,suburb,postcode,public_email,contact_form_url
Catholic,St Finn's,Launceston,7250,info@stfinns.catholic.edu.au,
Catholic,Bay College,Sydney,2000,,https://bay.catholic.edu.au/contact
";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

#[tokio::test]
async fn test_merge_standardizes_and_deduplicates() {
    let dir = TempDir::new().unwrap();
    let gov = write_fixture(dir.path(), "gov.csv", GOVERNMENT_CSV);
    let cath = write_fixture(dir.path(), "cath.csv", CATHOLIC_CSV);
    let output = dir.path().join("merged.csv");
    let db = dir.path().join("schools.db");

    let report = run_merge(
        &MergeArgs {
            inputs: vec![gov, dir.path().join("missing.csv"), cath],
            output: output.clone(),
            db: Some(db.clone()),
        },
        run_date(),
    )
    .await
    .unwrap();

    assert_eq!(report.rows_in, 5);
    assert_eq!(report.rows_out, 4);
    assert_eq!(report.missing_inputs, 1);

    let merged = read_records_csv(&output).unwrap();
    assert_eq!(merged.len(), 4);
    let hill = &merged[0];
    assert_eq!(hill.school_name.as_deref(), Some("Hill School"));
    assert_eq!(hill.public_email.as_deref(), Some("office@hill.tas.edu.au"));
    assert_eq!(hill.postcode.as_deref(), Some("7000"));
    assert_eq!(hill.last_verified_date, Some(run_date()));
    // Malformed emails do not survive standardization
    assert_eq!(merged[1].public_email, None);
    assert_eq!(merged[1].suburb.as_deref(), Some("North Hobart"));
    assert_eq!(merged[2].sector, Sector::Catholic);

    let pool = open_database(&db).await.unwrap();
    assert_eq!(load_sqlite(&pool).await.unwrap(), merged);
    pool.close().await;
}

#[tokio::test]
async fn test_merge_without_rows_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("merged.csv");
    let report = run_merge(
        &MergeArgs {
            inputs: vec![dir.path().join("missing.csv")],
            output: output.clone(),
            db: None,
        },
        run_date(),
    )
    .await
    .unwrap();

    assert_eq!(report.rows_out, 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_audit_dry_run_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(
        dir.path(),
        "schools.csv",
        "school_name,public_email,website_url,website_checked\n\
         Hill School,info@hill.tas.edu.au,https://hill.tas.edu.au,true\n\
         Ridge Primary,bursar@gmail.com,https://ridge.tas.edu.au,true\n",
    );
    let before = std::fs::read_to_string(&input).unwrap();

    let mut args = AuditArgs {
        input: input.clone(),
        db: None,
        dry_run: true,
    };
    let report = run_audit(&args, &ClassifierRules::default()).await.unwrap();
    assert_eq!(report.emails_before, 2);
    assert_eq!(report.emails_after, 1);
    assert_eq!(std::fs::read_to_string(&input).unwrap(), before);

    args.dry_run = false;
    run_audit(&args, &ClassifierRules::default()).await.unwrap();
    let rows = read_records_csv(&input).unwrap();
    assert_eq!(rows[0].email_validation_status.as_deref(), Some("valid"));
    assert_eq!(rows[1].public_email, None);
    assert!(!rows[1].website_checked);
}

#[tokio::test]
async fn test_geocode_export_and_search() {
    let dir = TempDir::new().unwrap();
    let gov = write_fixture(dir.path(), "gov.csv", GOVERNMENT_CSV);
    let cath = write_fixture(dir.path(), "cath.csv", CATHOLIC_CSV);
    let gazetteer = write_fixture(dir.path(), "AU.txt", GAZETTEER);
    let dataset = dir.path().join("schools.csv");

    run_merge(
        &MergeArgs {
            inputs: vec![gov, cath],
            output: dataset.clone(),
            db: None,
        },
        run_date(),
    )
    .await
    .unwrap();

    // Only Tasmanian centroids: the Sydney school stays without coordinates
    let matched = run_geocode(&GeocodeArgs {
        input: dataset.clone(),
        postcodes: gazetteer.clone(),
        state: Some("TAS".to_string()),
        db: None,
    })
    .await
    .unwrap();
    assert_eq!(matched, 3);
    let rows = read_records_csv(&dataset).unwrap();
    assert!(rows[0].coordinates().is_some());
    assert_eq!(rows[3].coordinates(), None);

    let summary = run_export_static(&ExportStaticArgs {
        input: dataset.clone(),
        out_dir: dir.path().join("site"),
    })
    .unwrap();
    assert_eq!(summary.schools, 3);
    assert_eq!(summary.postcodes, 2);

    let report = run_search(&SearchArgs {
        input: dataset.clone(),
        location: "7000".to_string(),
        radius_km: 10.0,
        limit: DEFAULT_SEARCH_LIMIT,
        postcodes: Some(gazetteer),
        state: None,
    })
    .unwrap();
    assert_eq!(report.resolved_location, "Postcode 7000");
    assert_eq!(report.count, 2);
    assert!(report.results.iter().all(|hit| hit.distance_km <= 10.0));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["school_name"], "Hill School");

    // Without a gazetteer a suburb name still resolves from the schools
    let report = run_search(&SearchArgs {
        input: dataset,
        location: "launceston".to_string(),
        radius_km: 5.0,
        limit: DEFAULT_SEARCH_LIMIT,
        postcodes: None,
        state: None,
    })
    .unwrap();
    assert_eq!(report.resolved_location, "Suburb Launceston");
    assert_eq!(report.count, 1);
}

#[tokio::test]
async fn test_search_reports_unresolved_location() {
    let dir = TempDir::new().unwrap();
    let dataset = write_fixture(dir.path(), "schools.csv", CATHOLIC_CSV);
    let err = run_search(&SearchArgs {
        input: dataset,
        location: "Atlantis".to_string(),
        radius_km: 5.0,
        limit: 10,
        postcodes: None,
        state: None,
    })
    .unwrap_err();
    assert!(err.to_string().contains("Atlantis"));
}
