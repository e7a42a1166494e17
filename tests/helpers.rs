// Shared test helpers for dataset fixtures.
//
// Used by several integration test files via `mod helpers;`.

use std::fs;
use std::path::{Path, PathBuf};

use school_contacts::{SchoolRecord, Sector};

/// A school row with the fields most tests care about.
#[allow(dead_code)] // Used by other test files
pub fn school(name: &str, suburb: &str, postcode: &str, email: Option<&str>) -> SchoolRecord {
    SchoolRecord {
        sector: Sector::Government,
        school_name: Some(name.to_string()),
        suburb: Some(suburb.to_string()),
        postcode: Some(postcode.to_string()),
        public_email: email.map(String::from),
        ..Default::default()
    }
}

/// Writes `contents` to `dir/name` and returns the path.
#[allow(dead_code)] // Used by other test files
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

/// A small GeoNames-style postal-code dump (tab separated, no header).
#[allow(dead_code)] // Used by other test files
pub const GAZETTEER: &str = "\
AU\t7000\tHobart\tTasmania\tTAS\t\t\t\t\t-42.8826\t147.3257\t4
AU\t7000\tNorth Hobart\tTasmania\tTAS\t\t\t\t\t-42.8722\t147.3169\t4
AU\t7250\tLaunceston\tTasmania\tTAS\t\t\t\t\t-41.4388\t147.1347\t4
AU\t2000\tSydney\tNew South Wales\tNSW\t\t\t\t\t-33.8688\t151.2093\t4
";
