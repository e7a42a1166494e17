//! Enrichment stage: fill gaps from school websites with checkpointing.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::config::{ClassifierRules, EnrichArgs};
use crate::enrich::{enrich_records, EnrichOptions, EnrichSummary, PoliteClient};
use crate::initialization::init_client;
use crate::storage::{read_records_csv, write_records_csv};

/// Enriches the dataset and writes it to `--output` (or back to the input).
///
/// The output is also saved every `checkpoint_every` attempted rows so an
/// interrupted campaign resumes where it stopped.
pub async fn run_enrich(
    args: &EnrichArgs,
    rules: &ClassifierRules,
    run_date: NaiveDate,
) -> Result<EnrichSummary> {
    let output = args.output.clone().unwrap_or_else(|| args.input.clone());
    let mut records = read_records_csv(&args.input)?;

    let http = args.http_config();
    let client = init_client(&http).context("Failed to initialize HTTP client")?;
    let client = PoliteClient::new(client, http);

    let options = EnrichOptions {
        max_sites: args.max_sites,
        checkpoint_every: args.checkpoint_every,
        run_date,
    };

    let summary = enrich_records(&mut records, &client, rules, &options, |rows| {
        write_records_csv(&output, rows)
    })
    .await?;

    write_records_csv(&output, &records)?;
    Ok(summary)
}
