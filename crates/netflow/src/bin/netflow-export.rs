//! Write the labeled flow dataset of a run as CSV.

#![deny(unused_import_braces, unused_qualifications)]

use color_eyre::eyre::{Context as _, Result};
use netflow::aggregate::RunSummary;
use netflow::export::{self, DatasetRow, DatasetWriter};
use smartcity::Scenario;
use std::path::PathBuf;

/// Label the flows of a simulation run and export them for training
///
/// Rows are written in the order of the input files.
#[derive(Debug, clap::Parser)]
struct CliArgs {
    /// The run generated attack traffic, otherwise every flow is labeled benign
    #[clap(long = "attacks")]
    attacks: bool,
    #[clap(long = "scenario", default_value = "normal")]
    scenario: String,
    /// Defaults to `<scenario>-enhanced-flows.csv`
    #[clap(long = "output")]
    output: Option<PathBuf>,

    /// Flow records written by the engine
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let args: CliArgs = clap::Parser::parse();

    let scenario: Scenario = match args.scenario.parse() {
        Ok(scenario) => scenario,
        Err(never) => match never {},
    };
    let output = args
        .output
        .unwrap_or_else(|| export::default_output(&scenario.to_string()));

    let records = netflow::read_all_flow_records(&args.files)?;
    log::info!(
        "Exporting {} flows to {}",
        records.len(),
        output.display()
    );

    let mut writer = DatasetWriter::create(&output)
        .wrap_err_with(|| format!("Cannot create dataset {}", output.display()))?;
    let mut summary = RunSummary::default();
    for record in &records {
        let row = DatasetRow::label(record, args.attacks);
        summary += RunSummary::labeled(row.label);
        writer
            .write_row(&row)
            .wrap_err_with(|| format!("Cannot write flow {} to {}", record.flow_id, output.display()))?;
    }
    writer
        .finish()
        .wrap_err_with(|| format!("Cannot flush dataset {}", output.display()))?;
    log::info!("Finished writing {}", output.display());

    println!("\nGenerated Files:");
    println!("  Flow CSV: {}", output.display());
    println!("\nFlow Analysis:");
    println!("  Total flows: {}", summary.total_flows);
    println!("  Normal flows: {}", summary.normal_flows);
    println!("  Attack flows: {}", summary.attack_flows);
    if args.attacks {
        println!("  Attack scenarios executed: {scenario}");
    }

    Ok(())
}
