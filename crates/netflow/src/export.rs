//! Labeled CSV dataset for training the classifier offline

use crate::metrics::FlowMetrics;
use crate::{FlowRecord, Proto};
use smartcity::{classify_traffic, District, DistrictTable, Label, TrafficType};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 18] = [
    "FlowId",
    "SrcIP",
    "DstIP",
    "SrcPort",
    "DstPort",
    "Protocol",
    "TxPackets",
    "RxPackets",
    "TxBytes",
    "RxBytes",
    "Duration",
    "Throughput",
    "PacketLoss",
    "Delay",
    "Jitter",
    "District",
    "TrafficType",
    "Label",
];

/// File the dataset of a scenario is written to if nothing else is given
pub fn default_output(scenario: &str) -> PathBuf {
    PathBuf::from(format!("{scenario}-enhanced-flows.csv"))
}

/// One line of the dataset, columns in the order of [`HEADER`]
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DatasetRow {
    pub flow_id: u32,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: Proto,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub duration: f64,
    pub throughput: f64,
    pub packet_loss: f64,
    pub delay: f64,
    pub jitter: f64,
    pub district: District,
    pub traffic_type: TrafficType,
    pub label: Label,
}

impl DatasetRow {
    /// Derive metrics and labels of a flow
    ///
    /// The district is taken from the export table.
    pub fn label(record: &FlowRecord, attacks_enabled: bool) -> Self {
        let metrics = FlowMetrics::derive(record);
        let class = classify_traffic(record.dst_port, attacks_enabled);
        Self {
            flow_id: record.flow_id,
            src_ip: record.src_addr,
            dst_ip: record.dst_addr,
            src_port: record.src_port,
            dst_port: record.dst_port,
            protocol: record.protocol,
            tx_packets: record.tx_packets,
            rx_packets: record.rx_packets,
            tx_bytes: record.tx_bytes,
            rx_bytes: record.rx_bytes,
            duration: metrics.duration.as_secs_f64(),
            throughput: metrics.throughput,
            packet_loss: metrics.packet_loss,
            delay: metrics.mean_delay.as_secs_f64(),
            jitter: metrics.mean_jitter.as_secs_f64(),
            district: DistrictTable::Export.classify(record.src_addr),
            traffic_type: class.traffic_type,
            label: class.label,
        }
    }
}

/// Writes the header on creation, so even an empty run produces a valid dataset
pub struct DatasetWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl DatasetWriter<std::fs::File> {
    pub fn create(path: &Path) -> csv::Result<Self> {
        Self::new(std::fs::File::create(path)?)
    }
}

impl<W: Write> DatasetWriter<W> {
    pub fn new(writer: W) -> csv::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &DatasetRow) -> csv::Result<()> {
        self.writer.serialize(row)
    }

    /// Flush and return the inner writer
    pub fn finish(self) -> csv::Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_record;

    type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

    const HEADER_LINE: &str = "FlowId,SrcIP,DstIP,SrcPort,DstPort,Protocol,TxPackets,RxPackets,TxBytes,RxBytes,Duration,Throughput,PacketLoss,Delay,Jitter,District,TrafficType,Label\n";

    fn write(rows: &[DatasetRow]) -> Result<String, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let mut writer = DatasetWriter::new(Vec::new())?;
        for row in rows {
            writer.write_row(row)?;
        }
        Ok(String::from_utf8(writer.finish()?)?)
    }

    #[test]
    fn test_empty_run_has_header() -> TestResult {
        assert_eq!(write(&[])?, HEADER_LINE);
        Ok(())
    }

    #[test]
    fn test_lost_attack_flow() -> TestResult {
        let row = DatasetRow::label(&test_record(), true);
        assert_eq!(row.traffic_type, TrafficType::Ddos);
        assert_eq!(row.label, Label::Attack);
        // the export table does not know the wireless subnet
        assert_eq!(row.district, District::Unknown);

        let csv = write(&[row])?;
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(HEADER_LINE.trim_end()));
        assert_eq!(
            lines.next(),
            Some("1,192.168.50.10,192.168.10.2,49153,9201,17,100,0,12800,0,20.0,0.0,1.0,0.0,0.0,Unknown,DDoS,1")
        );
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn test_attacks_disabled_labels_benign() {
        let row = DatasetRow::label(&test_record(), false);
        assert_eq!(row.traffic_type, TrafficType::Regular);
        assert_eq!(row.label, Label::Benign);
    }

    #[test]
    fn test_rows_keep_order() -> TestResult {
        let rows: Vec<DatasetRow> = (1..=3)
            .map(|flow_id| {
                let record = FlowRecord {
                    flow_id,
                    src_addr: Ipv4Addr::new(192, 168, 4, 2),
                    dst_port: 8200,
                    ..test_record()
                };
                DatasetRow::label(&record, true)
            })
            .collect();
        let csv = write(&rows)?;
        let ids: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap_or_default())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(csv.lines().skip(1).all(|line| line.ends_with(",University-Research,Medical,0")));
        Ok(())
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output("ddos"),
            PathBuf::from("ddos-enhanced-flows.csv")
        );
    }
}
