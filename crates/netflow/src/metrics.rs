//! Quality metrics of a single flow

use crate::FlowRecord;
use std::time::Duration;

/// Metrics derived from the raw counters of a [`FlowRecord`]
///
/// All values are finite; every division is guarded and yields 0 if its denominator is 0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlowMetrics {
    /// Time between the first transmitted and the last received packet
    pub duration: Duration,
    /// Received bits per second
    pub throughput: f64,
    /// Fraction of transmitted packets which never arrived, in `[0, 1]` for consistent counters
    pub packet_loss: f64,
    pub mean_delay: Duration,
    pub mean_jitter: Duration,
    /// The last packet arrived before the first was sent
    ///
    /// Happens for flows which never received anything, `duration` is zero then.
    pub inconsistent_timestamps: bool,
}

impl FlowMetrics {
    pub fn derive(record: &FlowRecord) -> Self {
        let (duration, inconsistent_timestamps) =
            match record.last_rx_time.checked_sub(record.first_tx_time) {
                Some(duration) => (duration, false),
                None => {
                    log::debug!(
                        "Flow {} received its last packet at {:?} before sending the first at {:?}",
                        record.flow_id,
                        record.last_rx_time,
                        record.first_tx_time
                    );
                    (Duration::ZERO, true)
                }
            };

        let throughput = if duration.is_zero() {
            0.0
        } else {
            record.rx_bytes as f64 * 8.0 / duration.as_secs_f64()
        };
        let packet_loss = if record.tx_packets == 0 {
            0.0
        } else {
            (record.tx_packets as f64 - record.rx_packets as f64) / record.tx_packets as f64
        };
        let mean_delay = div_duration(record.delay_sum, record.rx_packets);
        let mean_jitter = div_duration(record.jitter_sum, record.rx_packets.saturating_sub(1));

        Self {
            duration,
            throughput,
            packet_loss,
            mean_delay,
            mean_jitter,
            inconsistent_timestamps,
        }
    }
}

/// `total / count`, zero for an empty count
fn div_duration(total: Duration, count: u64) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / u128::from(count);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
