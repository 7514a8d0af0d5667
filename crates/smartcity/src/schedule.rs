//! Traffic schedule handed to the simulation engine
//!
//! A schedule consists of sinks, which receive traffic, and traffic tasks, which generate it.
//! [`compile`] assembles the schedule for a scenario and enforces the time window of the run.

use crate::families::AttackFamily;
use crate::normal::{self, Service};
use crate::topology::{NodeId, Topology};
use serde_with::DurationSecondsWithFrac;
use std::convert::Infallible;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use strum::IntoEnumIterator as _;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Udp,
    Tcp,
}

/// Why a task exists
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Origin {
    Normal(Service),
    Attack(AttackFamily),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    MaxPackets(u32),
    MaxBytes(u64),
}

#[serde_with::serde_as]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// One packet per interval
    Interval(#[serde_as(as = "DurationSecondsWithFrac<f64>")] Duration),
    /// Send as fast as the transport allows
    Saturate,
}

/// A scheduled instruction to generate traffic from `source` to `destination`
#[serde_with::serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TrafficTask {
    pub origin: Origin,
    pub source: NodeId,
    pub destination: Ipv4Addr,
    pub destination_port: u16,
    pub protocol: Protocol,
    pub budget: Budget,
    pub pacing: Pacing,
    pub packet_size: u32,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub start: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub stop: Duration,
}

/// A server application receiving traffic on `port`
#[serde_with::serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SinkTask {
    pub origin: Origin,
    pub node: NodeId,
    pub port: u16,
    pub protocol: Protocol,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub start: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub stop: Duration,
}

impl SinkTask {
    pub(crate) fn udp(origin: Origin, node: NodeId, port: u16, start: Duration, stop: Duration) -> Self {
        Self {
            origin,
            node,
            port,
            protocol: Protocol::Udp,
            start,
            stop,
        }
    }
}

/// Constant bit rate UDP sender
///
/// Defaults to 100 packets of 1024 bytes, one per second.
#[derive(Copy, Clone, Debug)]
pub(crate) struct UdpClient {
    port: u16,
    max_packets: u32,
    interval: Duration,
    packet_size: u32,
}

impl UdpClient {
    pub(crate) fn new(port: u16) -> Self {
        Self {
            port,
            max_packets: 100,
            interval: Duration::from_secs(1),
            packet_size: 1024,
        }
    }

    pub(crate) fn max_packets(mut self, max_packets: u32) -> Self {
        self.max_packets = max_packets;
        self
    }

    pub(crate) fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub(crate) fn packet_size(mut self, packet_size: u32) -> Self {
        self.packet_size = packet_size;
        self
    }

    pub(crate) fn task(
        &self,
        origin: Origin,
        source: NodeId,
        destination: Ipv4Addr,
        start: Duration,
        stop: Duration,
    ) -> TrafficTask {
        TrafficTask {
            origin,
            source,
            destination,
            destination_port: self.port,
            protocol: Protocol::Udp,
            budget: Budget::MaxPackets(self.max_packets),
            pacing: Pacing::Interval(self.interval),
            packet_size: self.packet_size,
            start,
            stop,
        }
    }
}

/// Fit `[start, stop)` into a run of length `sim_duration`
///
/// Returns `None` if nothing of the window is left.
fn clamp_window(start: Duration, stop: Duration, sim_duration: Duration) -> Option<Duration> {
    let stop = stop.min(sim_duration);
    (start < stop).then_some(stop)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Schedule {
    pub sinks: Vec<SinkTask>,
    pub tasks: Vec<TrafficTask>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty() && self.tasks.is_empty()
    }

    /// Drop everything which cannot run inside the simulation and clamp the rest
    pub fn within(mut self, sim_duration: Duration) -> Self {
        self.sinks.retain_mut(|sink| {
            match clamp_window(sink.start, sink.stop, sim_duration) {
                Some(stop) => {
                    sink.stop = stop;
                    true
                }
                None => {
                    log::debug!(
                        "Dropping sink on {} port {} starting at {:?}",
                        sink.node,
                        sink.port,
                        sink.start
                    );
                    false
                }
            }
        });
        self.tasks.retain_mut(|task| {
            match clamp_window(task.start, task.stop, sim_duration) {
                Some(stop) => {
                    task.stop = stop;
                    true
                }
                None => {
                    log::debug!(
                        "Dropping task {} -> {}:{} starting at {:?}",
                        task.source,
                        task.destination,
                        task.destination_port,
                        task.start
                    );
                    false
                }
            }
        });
        self
    }
}

impl std::ops::AddAssign for Schedule {
    fn add_assign(&mut self, rhs: Self) {
        self.sinks.extend(rhs.sinks);
        self.tasks.extend(rhs.tasks);
    }
}

/// Scenario selected on the command line
///
/// Parsing never fails, names which are not known end up in [`Scenario::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
    Normal,
    /// All attack families at once
    Mixed,
    Attack(AttackFamily),
    Unknown(String),
}

impl FromStr for Scenario {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "normal" => Scenario::Normal,
            "mixed" => Scenario::Mixed,
            _ => match AttackFamily::from_str(s) {
                Ok(family) => Scenario::Attack(family),
                Err(_) => Scenario::Unknown(s.to_string()),
            },
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Normal => f.write_str("normal"),
            Scenario::Mixed => f.write_str("mixed"),
            Scenario::Attack(family) => fmt::Display::fmt(family, f),
            Scenario::Unknown(name) => f.write_str(name),
        }
    }
}

impl Scenario {
    /// Attack families which need to be scheduled
    pub fn attack_families(&self) -> Vec<AttackFamily> {
        match self {
            Scenario::Mixed => AttackFamily::iter().collect(),
            Scenario::Attack(family) => vec![*family],
            Scenario::Normal | Scenario::Unknown(_) => Vec::new(),
        }
    }
}

/// Compile the full schedule of a run
///
/// The regular city services are always part of the schedule.
/// Attack traffic is only added if `attacks_enabled` is set, either for the single family of the
/// scenario or for all families in registry order if the scenario is [`Scenario::Mixed`].
/// The result only depends on the arguments.
pub fn compile(
    topology: &Topology,
    scenario: &Scenario,
    attacks_enabled: bool,
    sim_duration: Duration,
) -> Schedule {
    let mut schedule = normal::services(topology, sim_duration);

    if attacks_enabled {
        if let Scenario::Unknown(name) = scenario {
            log::warn!("Unknown scenario {name:?}, only regular traffic is generated");
        }
        for family in scenario.attack_families() {
            log::debug!("Scheduling {family} attack");
            schedule += family.generate(topology, sim_duration);
        }
    }

    schedule.within(sim_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const RUN: Duration = Duration::from_secs(180);

    #[test]
    fn test_scenario_names() {
        assert_eq!("mixed".parse::<Scenario>(), Ok(Scenario::Mixed));
        assert_eq!("normal".parse::<Scenario>(), Ok(Scenario::Normal));
        assert_eq!(
            "ddos".parse::<Scenario>(),
            Ok(Scenario::Attack(AttackFamily::Ddos))
        );
        assert_eq!(
            "teardrop".parse::<Scenario>(),
            Ok(Scenario::Unknown("teardrop".to_string()))
        );
        for family in AttackFamily::iter() {
            let scenario = Scenario::Attack(family);
            assert_eq!(scenario.to_string().parse::<Scenario>(), Ok(scenario));
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let topo = Topology::default();
        let first = serde_json::to_string(&compile(&topo, &Scenario::Mixed, true, RUN)).unwrap();
        let second = serde_json::to_string(&compile(&topo, &Scenario::Mixed, true, RUN)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_attacks_disabled_is_normal_only() {
        let topo = Topology::default();
        let normal = compile(&topo, &Scenario::Normal, false, RUN);
        assert!(!normal.tasks.is_empty());
        for scenario in [Scenario::Mixed, Scenario::Attack(AttackFamily::Botnet)] {
            assert_eq!(compile(&topo, &scenario, false, RUN), normal);
        }
        assert!(normal
            .tasks
            .iter()
            .all(|task| matches!(task.origin, Origin::Normal(_))));
    }

    #[test]
    fn test_unknown_scenario_is_normal_only() {
        let topo = Topology::default();
        let unknown = compile(
            &topo,
            &Scenario::Unknown("teardrop".to_string()),
            true,
            RUN,
        );
        assert_eq!(unknown, compile(&topo, &Scenario::Normal, true, RUN));
    }

    #[test]
    fn test_mixed_is_union_of_all_families() {
        let topo = Topology::default();
        let mut expected = normal::services(&topo, RUN);
        for family in AttackFamily::iter() {
            expected += family.generate(&topo, RUN);
        }
        let expected = expected.within(RUN);
        let mixed = compile(&topo, &Scenario::Mixed, true, RUN);
        assert_eq!(mixed, expected);

        let union: HashSet<_> = AttackFamily::iter()
            .flat_map(|family| compile(&topo, &Scenario::Attack(family), true, RUN).tasks)
            .collect();
        let mixed_tasks: HashSet<_> = mixed.tasks.into_iter().collect();
        assert_eq!(mixed_tasks, union);
    }

    #[test]
    fn test_single_family_adds_to_normal() {
        let topo = Topology::default();
        let normal = compile(&topo, &Scenario::Normal, true, RUN);
        let apt = compile(&topo, &Scenario::Attack(AttackFamily::Apt), true, RUN);
        assert_eq!(apt.tasks[..normal.tasks.len()], normal.tasks[..]);
        let attack_tasks = &apt.tasks[normal.tasks.len()..];
        assert_eq!(attack_tasks.len(), 3);
        assert!(attack_tasks
            .iter()
            .all(|task| task.origin == Origin::Attack(AttackFamily::Apt)));
    }

    #[test]
    fn test_window_invariant() {
        let topo = Topology::default();
        for secs in [1, 30, 60, 75, 100, 180, 600] {
            let sim_duration = Duration::from_secs(secs);
            let schedule = compile(&topo, &Scenario::Mixed, true, sim_duration);
            for task in &schedule.tasks {
                assert!(task.start < task.stop, "{task:?}");
                assert!(task.stop <= sim_duration, "{task:?}");
            }
            for sink in &schedule.sinks {
                assert!(sink.start < sink.stop, "{sink:?}");
                assert!(sink.stop <= sim_duration, "{sink:?}");
            }
        }
    }

    #[test]
    fn test_short_run_drops_late_tasks() {
        let topo = Topology::default();
        let schedule = compile(&topo, &Scenario::Mixed, true, Duration::from_secs(60));
        assert!(schedule
            .tasks
            .iter()
            .all(|task| task.start < Duration::from_secs(60)));
        // the port scan starts at 50s and has to survive
        assert!(schedule
            .tasks
            .iter()
            .any(|task| task.origin == Origin::Attack(AttackFamily::PortScan)));
        // the blockchain attack starts at 130s
        assert!(!schedule
            .tasks
            .iter()
            .any(|task| task.origin == Origin::Attack(AttackFamily::Blockchain)));
    }

    #[test]
    fn test_clamp_window() {
        let s = Duration::from_secs;
        assert_eq!(clamp_window(s(10), s(20), s(30)), Some(s(20)));
        assert_eq!(clamp_window(s(10), s(40), s(30)), Some(s(30)));
        assert_eq!(clamp_window(s(30), s(40), s(30)), None);
        assert_eq!(clamp_window(s(25), s(10), s(30)), None);
    }

    #[test]
    fn test_schedule_json_shape() {
        let topo = Topology::default();
        let schedule = compile(&topo, &Scenario::Normal, false, RUN);
        let json = serde_json::to_value(&schedule.tasks[0]).unwrap();
        assert_eq!(json["origin"]["kind"], "normal");
        assert_eq!(json["protocol"], "UDP");
        assert!(json["start"].is_f64());
        assert_eq!(json["budget"]["max_packets"], 50);
    }
}
