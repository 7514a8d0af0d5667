//! Client of the ML firewall oracle
//!
//! Every flow is sent as one JSON object over a fresh TCP connection.
//! The oracle answers with a JSON object, only the presence of `"shouldBlock":true` matters.
//! The client fails open: if the oracle cannot be reached or answers garbage, the flow is allowed.

use crate::metrics::FlowMetrics;
use crate::FlowRecord;
use smartcity::District;
use std::io::{Read as _, Write as _};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};

pub const DEFAULT_ORACLE_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8888));

/// Size of the single read of the response
const RESPONSE_BUFFER: usize = 1024;
const BLOCK_MARKER: &[u8] = br#""shouldBlock":true"#;

/// Features of one flow as expected by the oracle
///
/// The field order is the key order on the wire.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleQuery {
    pub flow_id: u32,
    #[serde(rename = "srcIP")]
    pub src_ip: Ipv4Addr,
    #[serde(rename = "dstIP")]
    pub dst_ip: Ipv4Addr,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    /// Seconds
    pub duration: f64,
    /// Bits per second
    pub throughput: f64,
    pub packet_loss: f64,
    /// Mean delay in seconds
    pub delay: f64,
    /// Mean jitter in seconds
    pub jitter: f64,
    pub dst_port: u16,
    pub district: District,
}

impl OracleQuery {
    pub fn new(record: &FlowRecord, metrics: &FlowMetrics, district: District) -> Self {
        Self {
            flow_id: record.flow_id,
            src_ip: record.src_addr,
            dst_ip: record.dst_addr,
            tx_packets: record.tx_packets,
            rx_packets: record.rx_packets,
            tx_bytes: record.tx_bytes,
            rx_bytes: record.rx_bytes,
            duration: metrics.duration.as_secs_f64(),
            throughput: metrics.throughput,
            packet_loss: metrics.packet_loss,
            delay: metrics.mean_delay.as_secs_f64(),
            jitter: metrics.mean_jitter.as_secs_f64(),
            dst_port: record.dst_port,
            district,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct OracleClient {
    addr: SocketAddr,
}

impl Default for OracleClient {
    fn default() -> Self {
        Self::new(DEFAULT_ORACLE_ADDR)
    }
}

impl OracleClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Ask the oracle whether the flow should be blocked
    ///
    /// Returns `false` on any failure.
    pub fn should_block(&self, query: &OracleQuery) -> bool {
        let request = match serde_json::to_vec(query) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("Cannot serialize oracle query for flow {}: {err}", query.flow_id);
                return false;
            }
        };
        match self.exchange(&request) {
            Ok(response) => contains_block_marker(&response),
            Err(err) => {
                log::debug!(
                    "Oracle {} failed for flow {}, allowing it: {err}",
                    self.addr,
                    query.flow_id
                );
                false
            }
        }
    }

    /// Send one request and read the response with a single read
    fn exchange(&self, request: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut stream = TcpStream::connect(self.addr)?;
        stream.write_all(request)?;
        let mut buffer = vec![0; RESPONSE_BUFFER];
        let len = stream.read(&mut buffer)?;
        buffer.truncate(len);
        Ok(buffer)
    }
}

fn contains_block_marker(response: &[u8]) -> bool {
    response
        .windows(BLOCK_MARKER.len())
        .any(|window| window == BLOCK_MARKER)
}
