//! CSV persistence of school records.
//!
//! Columns follow `SchoolRecord`'s field order. Reading is lenient: missing
//! columns take defaults, unknown columns are ignored, and every text field is
//! cleaned at ingestion.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use log::debug;

use crate::record::SchoolRecord;

/// Column names in write order.
pub const CSV_COLUMNS: &[&str] = &[
    "sector",
    "school_name",
    "suburb",
    "postcode",
    "phone",
    "public_email",
    "contact_form_url",
    "website_url",
    "source_directory_url",
    "last_verified_date",
    "lat",
    "lon",
    "email_validation_status",
    "email_validation_reason",
    "website_checked",
];

/// Reads records from any CSV source.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<SchoolRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line, row) in csv_reader.deserialize::<SchoolRecord>().enumerate() {
        let mut record = row.with_context(|| format!("Invalid CSV row {}", line + 2))?;
        record.clean_text_fields();
        records.push(record);
    }
    Ok(records)
}

/// Reads a records CSV file.
pub fn read_records_csv(path: &Path) -> Result<Vec<SchoolRecord>> {
    let file = File::open(path).context(format!("Failed to open CSV file: {}", path.display()))?;
    let records = read_records_from(file).context(format!("Failed to read {}", path.display()))?;
    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Writes records as CSV to any sink, header first.
pub fn write_records_to<W: Write>(writer: W, records: &[SchoolRecord]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    if records.is_empty() {
        csv_writer.write_record(CSV_COLUMNS)?;
    }
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes a records CSV file, replacing it atomically via a sibling temp file.
pub fn write_records_csv(path: &Path, records: &[SchoolRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("csv.tmp");
    let file = File::create(&tmp_path)
        .context(format!("Failed to create output file: {}", tmp_path.display()))?;
    write_records_to(file, records)?;
    std::fs::rename(&tmp_path, path)
        .context(format!("Failed to replace {}", path.display()))?;
    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
