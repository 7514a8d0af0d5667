//! Post-process the flow records reported by the simulation engine
//!
//! The records are turned into metrics, labeled, judged by the ML oracle and exported as a dataset.

#![deny(unused_import_braces, unused_qualifications)]

pub mod aggregate;
pub mod export;
pub mod metrics;
pub mod oracle;

use color_eyre::eyre::{Context as _, Result};
use serde_with::DurationSecondsWithFrac;
use std::io::BufReader;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

/// Counters of one flow as reported by the flow monitor of the engine
///
/// Times are fractional seconds since the start of the simulation.
///
/// ```json
/// {
///     "flow_id" : 1,
///     "src_addr" : "192.168.50.10",
///     "dst_addr" : "192.168.10.2",
///     "src_port" : 49153,
///     "dst_port" : 9201,
///     "protocol" : 17,
///     "tx_packets" : 500,
///     "rx_packets" : 480,
///     "tx_bytes" : 78000,
///     "rx_bytes" : 74880,
///     "first_tx_time" : 85.0,
///     "last_rx_time" : 90.0,
///     "delay_sum" : 0.96,
///     "jitter_sum" : 0.0479
/// }
/// ```
#[serde_with::serde_as]
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlowRecord {
    pub flow_id: u32,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: Proto,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub first_tx_time: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub last_rx_time: Duration,
    /// Sum of the one-way delays of all received packets
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub delay_sum: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub jitter_sum: Duration,
}

/// <https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml#protocol-numbers-1>
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct Proto(pub u8);

impl Proto {
    /// Internet Control Message
    pub const ICMP: Self = Self(1);
    /// Transmission Control
    pub const TCP: Self = Self(6);
    /// User Datagram
    pub const UDP: Self = Self(17);
}

impl std::fmt::Display for Proto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read the JSON array of flow records written by the engine
///
/// Decoding errors point to the offending JSON path.
pub fn read_flow_records(path: &Path) -> Result<Vec<FlowRecord>> {
    let file = std::fs::File::open(path)
        .wrap_err_with(|| format!("Cannot open flow records {}", path.display()))?;
    let jd = &mut serde_json::Deserializer::from_reader(BufReader::new(file));
    let records: Vec<FlowRecord> = serde_path_to_error::deserialize(jd)
        .wrap_err_with(|| format!("Invalid flow records in {}", path.display()))?;
    Ok(records)
}

/// Read all files in order and concatenate their records
pub fn read_all_flow_records(paths: &[impl AsRef<Path>]) -> Result<Vec<FlowRecord>> {
    let mut records = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let mut file_records = read_flow_records(path)?;
        log::info!(
            "Loaded {} flows from {}",
            file_records.len(),
            path.display()
        );
        records.append(&mut file_records);
    }
    Ok(records)
}

#[cfg(test)]
pub(crate) fn test_record() -> FlowRecord {
    FlowRecord {
        flow_id: 1,
        src_addr: Ipv4Addr::new(192, 168, 50, 10),
        dst_addr: Ipv4Addr::new(192, 168, 10, 2),
        src_port: 49153,
        dst_port: 9201,
        protocol: Proto::UDP,
        tx_packets: 100,
        rx_packets: 0,
        tx_bytes: 12_800,
        rx_bytes: 0,
        first_tx_time: Duration::from_secs(80),
        last_rx_time: Duration::from_secs(100),
        delay_sum: Duration::ZERO,
        jitter_sum: Duration::ZERO,
    }
}
