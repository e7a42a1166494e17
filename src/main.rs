//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `school_contacts` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Stage dispatch and user-facing output
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use school_contacts::config::{Command, Opt};
use school_contacts::initialization::init_logger_with;
use school_contacts::run::{
    load_rules, run_audit, run_enrich, run_export_static, run_geocode, run_merge, run_search,
};

async fn dispatch(opt: Opt) -> Result<()> {
    let rules = load_rules(opt.rules.as_deref())?;
    let run_date = chrono::Local::now().date_naive();

    match opt.command {
        Command::Merge(args) => {
            let report = run_merge(&args, run_date).await?;
            report.log_summary();
            println!(
                "Merged {} rows into {}",
                report.rows_out,
                args.output.display()
            );
        }
        Command::Audit(args) => {
            let report = run_audit(&args, &rules).await?;
            report.log_summary(&args.input.display().to_string());
            println!(
                "Audited {} rows: emails {} -> {}{}",
                report.rows,
                report.emails_before,
                report.emails_after,
                if args.dry_run { " (dry run)" } else { "" }
            );
        }
        Command::Enrich(args) => {
            let summary = run_enrich(&args, &rules, run_date).await?;
            summary.log_summary();
            println!(
                "Attempted {} of {} eligible sites: {} emails, {} contact forms filled",
                summary.attempted,
                summary.eligible,
                summary.emails_filled(),
                summary.contact_forms_filled()
            );
        }
        Command::Geocode(args) => {
            let matched = run_geocode(&args).await?;
            println!("Geocoded {} rows in {}", matched, args.input.display());
        }
        Command::ExportStatic(args) => {
            let summary = run_export_static(&args)?;
            println!(
                "Exported {} schools to {}",
                summary.schools,
                args.out_dir.display()
            );
        }
        Command::Search(args) => {
            let report = run_search(&args)?;
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize results")?;
            println!("{json}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = dispatch(opt).await {
        eprintln!("school_contacts error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
