use std::{fs, path::PathBuf};

use clap::Parser;
use eyre::Context;
use forecast_feed::{OutputRecord, VariableId};
use tracing_subscriber::EnvFilter;

/// Convert a varustatistik spreadsheet export into an external
/// forecast feed.
#[derive(Parser)]
#[command(name = "varustatistik-forecast", version)]
struct Cli {
    /// Input spreadsheet path (.xlsx or .xls).
    input: PathBuf,
    /// Output path for the generated feed.
    #[arg(default_value = "external_forecast_output.txt")]
    output: PathBuf,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,varustatistik_forecast=info,forecast_feed=debug")
        }))
        .init();

    let cli = Cli::parse();

    tracing::info!("Reading file: {}", cli.input.display());
    let spreadsheet_bytes =
        fs::read(&cli.input).wrap_err_with(|| format!("Unable to read {:?}", cli.input))?;
    let records = forecast_feed::extract_records(&spreadsheet_bytes)
        .wrap_err_with(|| format!("Unable to generate forecast feed from {:?}", cli.input))?;
    let feed = forecast_feed::render(&records)?;
    fs::write(&cli.output, &feed)
        .wrap_err_with(|| format!("Unable to write {:?}", cli.output))?;

    tracing::info!("Found {} hourly totals", records.len());
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        tracing::info!("Date range: {} to {}", first.date, last.date);
    }
    let (kallmat_count, varmmat_count) = variable_counts(&records);
    tracing::info!("Kallmat records: {kallmat_count}");
    tracing::info!("Varmmat records: {varmmat_count}");
    tracing::info!("Output written to: {}", cli.output.display());

    Ok(())
}

/// Number of (kallmat, varmmat) records in the feed.
fn variable_counts(records: &[OutputRecord]) -> (usize, usize) {
    let kallmat = records
        .iter()
        .filter(|record| record.variable_id == VariableId::Kallmat)
        .count();
    (kallmat, records.len() - kallmat)
}
