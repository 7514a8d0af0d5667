//! Compile the traffic schedule of a scenario for the simulation engine.

#![deny(unused_import_braces)]
// clap 4.0 derive expansion of `default_value_t` trips this lint on newer rustc
#![warn(unused_qualifications)]

use color_eyre::eyre::{eyre, Context as _, Result};
use smartcity::topology::SegmentPlan;
use smartcity::{Scenario, Schedule, Topology};
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;
use std::time::Duration;

/// Compile the traffic schedule of a smart-city scenario
///
/// The schedule and the address plan of the city are written as JSON, either to the output file or to stdout.
#[derive(Debug, clap::Parser)]
struct CliArgs {
    /// Schedule the attack traffic of the scenario, otherwise only the regular services run.
    #[clap(long = "attacks")]
    attacks: bool,
    /// Name of an attack family, `mixed` for all of them, or `normal`
    #[clap(long = "scenario", default_value = "normal")]
    scenario: String,
    /// Length of the simulation in seconds
    #[clap(long = "time", default_value_t = 180.0)]
    time: f64,
    #[clap(long = "output")]
    output: Option<PathBuf>,
}

#[serde_with::serde_as]
#[derive(serde::Serialize)]
struct ScheduleFile<'a> {
    scenario: String,
    attacks_enabled: bool,
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    sim_duration: Duration,
    segments: Vec<SegmentPlan>,
    schedule: &'a Schedule,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let args: CliArgs = clap::Parser::parse();

    let sim_duration = Duration::try_from_secs_f64(args.time)
        .map_err(|err| eyre!("Invalid simulation time {}: {err}", args.time))?;
    let scenario: Scenario = match args.scenario.parse() {
        Ok(scenario) => scenario,
        Err(never) => match never {},
    };
    let topology = Topology::default();

    log::info!(
        "Compiling scenario {scenario} with attacks {} for {:?}",
        if args.attacks { "enabled" } else { "disabled" },
        sim_duration,
    );
    let schedule = smartcity::compile(&topology, &scenario, args.attacks, sim_duration);
    log::info!(
        "Scheduled {} sinks and {} traffic tasks for {} end devices",
        schedule.sinks.len(),
        schedule.tasks.len(),
        topology.end_devices(),
    );

    let file = ScheduleFile {
        scenario: scenario.to_string(),
        attacks_enabled: args.attacks,
        sim_duration,
        segments: topology.plan(),
        schedule: &schedule,
    };
    match args.output {
        Some(path) => {
            let mut writer = BufWriter::new(
                std::fs::File::create(&path)
                    .wrap_err_with(|| format!("Cannot create {}", path.display()))?,
            );
            serde_json::to_writer(&mut writer, &file)?;
            writer.flush()?;
            log::info!("Wrote schedule to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &file)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
