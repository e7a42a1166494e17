//! Audit stage: re-classify published emails in place.

use anyhow::Result;
use log::info;

use super::save_to_database;
use crate::audit::{audit_emails, AuditReport};
use crate::config::{AuditArgs, ClassifierRules};
use crate::storage::{read_records_csv, write_records_csv};

/// Audits the dataset's emails; with `dry_run` only the report is produced.
pub async fn run_audit(args: &AuditArgs, rules: &ClassifierRules) -> Result<AuditReport> {
    let mut records = read_records_csv(&args.input)?;
    let report = audit_emails(&mut records, rules);

    if args.dry_run {
        info!("Dry run: {} left unchanged", args.input.display());
        return Ok(report);
    }

    write_records_csv(&args.input, &records)?;
    save_to_database(args.db.as_deref(), &records).await?;
    Ok(report)
}
