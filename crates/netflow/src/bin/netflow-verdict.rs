//! Ask the ML firewall oracle for a verdict on every flow of a run.

#![deny(unused_import_braces, unused_qualifications)]

use color_eyre::eyre::{Context as _, Result};
use netflow::aggregate::RunSummary;
use netflow::metrics::FlowMetrics;
use netflow::oracle::{OracleClient, OracleQuery, DEFAULT_ORACLE_ADDR};
use netflow::FlowRecord;
use rayon::prelude::*;
use smartcity::{District, DistrictTable, Scenario};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Judge the flows of a simulation run with the ML firewall oracle
///
/// Flows are sent to the oracle in parallel, blocked flows are reported in the order of the input.
/// An unreachable oracle blocks nothing.
#[derive(Debug, clap::Parser)]
struct CliArgs {
    /// The run generated attack traffic
    ///
    /// Informational like `--scenario`, it only names the scenario in the log. Verdicts come
    /// from the oracle alone.
    #[clap(long = "attacks")]
    attacks: bool,
    #[clap(long = "scenario", default_value = "normal")]
    scenario: String,
    /// Address of the oracle
    #[clap(long = "oracle", default_value_t = DEFAULT_ORACLE_ADDR)]
    oracle: SocketAddr,
    /// Number of concurrent oracle queries, defaults to the number of CPUs
    #[clap(long = "threads")]
    threads: Option<usize>,

    /// Flow records written by the engine
    #[clap(required = true)]
    files: Vec<PathBuf>,
}

struct Verdict {
    district: District,
    metrics: FlowMetrics,
    should_block: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let args: CliArgs = clap::Parser::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .wrap_err("Cannot configure the thread pool")?;
    }

    let scenario: Scenario = match args.scenario.parse() {
        Ok(scenario) => scenario,
        Err(never) => match never {},
    };
    if args.attacks {
        log::info!("Judging flows of scenario {scenario}");
    }

    let records = netflow::read_all_flow_records(&args.files)?;
    let oracle = OracleClient::new(args.oracle);
    log::info!(
        "Querying oracle {} for {} flows",
        oracle.addr(),
        records.len()
    );

    let progress_bar = indicatif::ProgressBar::with_draw_target(
        Some(records.len() as u64),
        indicatif::ProgressDrawTarget::stderr_with_hz(1),
    );
    progress_bar.set_style(indicatif::ProgressStyle::default_bar().template(
        "[{elapsed_precise}] ETA: {eta_precise} {wide_bar:40.cyan/blue} {pos:>7}/{len:7} \
         {percent}%",
    )?);
    let verdicts: Vec<Verdict> = records
        .par_iter()
        .map(|record| {
            let verdict = judge(&oracle, record);
            progress_bar.inc(1);
            verdict
        })
        .collect();
    progress_bar.finish_and_clear();

    println!("\n=== AI FIREWALL ANALYSIS ===");
    for (record, verdict) in records.iter().zip(&verdicts) {
        if verdict.should_block {
            print_blocked(record, verdict);
        }
    }

    let summary: RunSummary = verdicts
        .par_iter()
        .map(|verdict| RunSummary::verdict(verdict.should_block))
        .reduce(RunSummary::default, |a, b| a + b);
    println!("\nAI Firewall Summary:");
    println!("Total flows: {}", summary.total_flows);
    println!("Blocked threats: {}", summary.blocked_flows);
    println!("Protection rate: {}%", summary.protection_rate());

    Ok(())
}

fn judge(oracle: &OracleClient, record: &FlowRecord) -> Verdict {
    let metrics = FlowMetrics::derive(record);
    let district = DistrictTable::Live.classify(record.src_addr);
    let should_block = oracle.should_block(&OracleQuery::new(record, &metrics, district));
    Verdict {
        district,
        metrics,
        should_block,
    }
}

fn print_blocked(record: &FlowRecord, verdict: &Verdict) {
    println!("[THREAT BLOCKED] Flow {}", record.flow_id);
    println!(
        "  {} -> {}:{}",
        record.src_addr, record.dst_addr, record.dst_port
    );
    println!("  District: {}", verdict.district);
    println!(
        "  Duration: {}s | Loss: {}%",
        verdict.metrics.duration.as_secs_f64(),
        verdict.metrics.packet_loss * 100.0
    );
}
