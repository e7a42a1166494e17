//! Merge stage: sector CSVs into one deduplicated dataset.

use chrono::NaiveDate;
use log::{info, warn};

use anyhow::Result;

use super::save_to_database;
use crate::config::MergeArgs;
use crate::record::{deduplicate, sector_summary, standardize, SectorSummary};
use crate::storage::{read_records_csv, write_records_csv};

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    /// Rows read across all inputs
    pub rows_in: usize,
    /// Rows after deduplication
    pub rows_out: usize,
    /// Inputs that did not exist
    pub missing_inputs: usize,
    /// Coverage per sector of the merged rows
    pub sectors: Vec<SectorSummary>,
}

impl MergeReport {
    /// Logs the row counts and one line per sector.
    pub fn log_summary(&self) {
        info!(
            "Merged records: {} ({} read, {} duplicates dropped)",
            self.rows_out,
            self.rows_in,
            self.rows_in - self.rows_out
        );
        for s in &self.sectors {
            info!(
                "{}: total={} | email%={:.2} | contact_form_only%={:.2}",
                s.sector,
                s.total,
                s.email_pct(),
                s.contact_form_only_pct()
            );
        }
    }
}

/// Reads every existing input, standardizes, stamps `last_verified_date`,
/// deduplicates and writes the CSV (plus SQLite when requested).
///
/// With no rows at all nothing is written.
pub async fn run_merge(args: &MergeArgs, run_date: NaiveDate) -> Result<MergeReport> {
    let mut rows = Vec::new();
    let mut missing_inputs = 0;
    for input in &args.inputs {
        if !input.exists() {
            warn!("Skipping missing input: {}", input.display());
            missing_inputs += 1;
            continue;
        }
        let mut records = read_records_csv(input)?;
        info!("Read {} rows from {}", records.len(), input.display());
        rows.append(&mut records);
    }

    let rows_in = rows.len();
    if rows.is_empty() {
        warn!("No sector rows found; nothing written");
        return Ok(MergeReport {
            rows_in,
            rows_out: 0,
            missing_inputs,
            sectors: Vec::new(),
        });
    }

    let mut merged = standardize(rows);
    for record in &mut merged {
        record.last_verified_date = Some(run_date);
    }
    let merged = deduplicate(merged);

    write_records_csv(&args.output, &merged)?;
    save_to_database(args.db.as_deref(), &merged).await?;

    Ok(MergeReport {
        rows_in,
        rows_out: merged.len(),
        missing_inputs,
        sectors: sector_summary(&merged),
    })
}
