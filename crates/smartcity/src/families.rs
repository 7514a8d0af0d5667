//! Registry of attack families
//!
//! Every family is a pure function of the topology and the run length.
//! Sinks are started ahead of the attack and stay up until the end of the run.
//! Nodes are picked modulo the size of their group, so a smaller city only gets fewer distinct
//! attackers. Tasks whose source or target does not exist in the topology are left out.

use crate::classify::TrafficType;
use crate::schedule::{Origin, Schedule, SinkTask, UdpClient};
use crate::topology::{NodeGroup, NodeId, Segment, Topology};
use itertools::Itertools as _;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Attack families in registry order
///
/// The textual form is the scenario name.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum AttackFamily {
    PortScan,
    Ddos,
    /// Multi-stage advanced persistent threat
    Apt,
    Ransomware,
    Botnet,
    Medical,
    Grid,
    Supply,
    /// Data exfiltration out of the finance district
    Finance,
    Recon,
    Mitm6g,
    SideChannel,
    Slicing,
    MlPoison,
    Home,
    University,
    Edge,
    Quantum,
    GpsSpoof,
    Blockchain,
}

impl AttackFamily {
    /// Sinks and tasks of the attack, clamping happens in [`crate::schedule::compile`]
    pub fn generate(self, topology: &Topology, sim_duration: Duration) -> Schedule {
        let attack = Attack::new(topology, self, sim_duration);
        let generate: fn(Attack<'_>) -> Schedule = match self {
            AttackFamily::PortScan => port_scan,
            AttackFamily::Ddos => ddos,
            AttackFamily::Apt => apt,
            AttackFamily::Ransomware => ransomware,
            AttackFamily::Botnet => botnet,
            AttackFamily::Medical => medical,
            AttackFamily::Grid => grid,
            AttackFamily::Supply => supply,
            AttackFamily::Finance => finance,
            AttackFamily::Recon => recon,
            AttackFamily::Mitm6g => mitm6g,
            AttackFamily::SideChannel => side_channel,
            AttackFamily::Slicing => slicing,
            AttackFamily::MlPoison => ml_poison,
            AttackFamily::Home => home,
            AttackFamily::University => university,
            AttackFamily::Edge => edge,
            AttackFamily::Quantum => quantum,
            AttackFamily::GpsSpoof => gps_spoof,
            AttackFamily::Blockchain => blockchain,
        };
        generate(attack)
    }

    /// Label the classifier assigns to the traffic of this family
    pub fn traffic_type(self) -> TrafficType {
        match self {
            AttackFamily::PortScan => TrafficType::PortScan,
            AttackFamily::Ddos => TrafficType::Ddos,
            AttackFamily::Apt => TrafficType::Apt,
            AttackFamily::Ransomware => TrafficType::Ransomware,
            AttackFamily::Botnet => TrafficType::Botnet,
            AttackFamily::Medical => TrafficType::MedicalHijack,
            AttackFamily::Grid => TrafficType::GridAttack,
            AttackFamily::Supply => TrafficType::SupplyChain,
            AttackFamily::Finance => TrafficType::DataExfiltration,
            AttackFamily::Recon => TrafficType::Reconnaissance,
            AttackFamily::Mitm6g => TrafficType::Mitm6G,
            AttackFamily::SideChannel => TrafficType::SideChannel,
            AttackFamily::Slicing => TrafficType::NetworkSlicing,
            AttackFamily::MlPoison => TrafficType::MlPoisoning,
            AttackFamily::Home => TrafficType::HomeAttack,
            AttackFamily::University => TrafficType::UniversityAttack,
            AttackFamily::Edge => TrafficType::EdgeCompromise,
            AttackFamily::Quantum => TrafficType::QuantumAttack,
            AttackFamily::GpsSpoof => TrafficType::GpsSpoofing,
            AttackFamily::Blockchain => TrafficType::BlockchainAttack,
        }
    }
}
const fn secs(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

const fn millis(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Schedule under construction for one family
struct Attack<'a> {
    topology: &'a Topology,
    origin: Origin,
    sim_duration: Duration,
    schedule: Schedule,
    /// `(port, source, start)` of all tasks so far
    scheduled: HashSet<(u16, NodeId, Duration)>,
}

impl<'a> Attack<'a> {
    fn new(topology: &'a Topology, family: AttackFamily, sim_duration: Duration) -> Self {
        Self {
            topology,
            origin: Origin::Attack(family),
            sim_duration,
            schedule: Schedule::default(),
            scheduled: HashSet::new(),
        }
    }

    /// UDP sink on the `i`-th member of `group`, listening from `start` until the end of the run
    fn sink(&mut self, group: NodeGroup, i: u32, port: u16, start: Duration) {
        let Some(node) = self.nth(group, i) else {
            log::debug!("No {group} left for the {:?} sink on port {port}", self.origin);
            return;
        };
        self.schedule.sinks.push(SinkTask::udp(
            self.origin,
            node,
            port,
            start,
            self.sim_duration,
        ));
    }

    /// Schedule `client` from `source` to `destination`
    ///
    /// Skipped if either endpoint is missing or the same source already sends to the port at
    /// the same time.
    fn client(
        &mut self,
        client: UdpClient,
        source: Option<NodeId>,
        destination: Option<Ipv4Addr>,
        start: Duration,
        stop: Duration,
    ) {
        let (Some(source), Some(destination)) = (source, destination) else {
            log::debug!("Skipping {:?} task without endpoints", self.origin);
            return;
        };
        let task = client.task(self.origin, source, destination, start, stop);
        if self
            .scheduled
            .insert((task.destination_port, source, start))
        {
            self.schedule.tasks.push(task);
        }
    }

    /// The `i`-th member of `group`, wrapping around
    ///
    /// Returns `None` if the topology has no nodes in `group`.
    fn nth(&self, group: NodeGroup, i: u32) -> Option<NodeId> {
        let count = self.topology.count(group);
        (count > 0).then(|| NodeId::new(group, i % count))
    }

    /// Address of the member at `position` of the segment, if there is one
    fn member(&self, segment: Segment, position: u32) -> Option<Ipv4Addr> {
        let members = self.topology.members(segment).len();
        (usize::try_from(position).map_or(false, |position| position < members))
            .then(|| self.topology.interface(segment, position))
    }

    /// Wireless address of the `i`-th member of `group`, wrapping around
    fn station(&self, group: NodeGroup, i: u32) -> Option<Ipv4Addr> {
        self.nth(group, i)
            .and_then(|node| self.topology.interface_of(Segment::Wireless, node))
    }
}

/// Sweep of well known service ports on one server per critical district
fn port_scan(mut attack: Attack<'_>) -> Schedule {
    const PORTS: [u16; 4] = [21, 22, 80, 443];
    let targets = [Segment::HospitalLan, Segment::PowerLan, Segment::FinanceLan];

    for ((t, segment), (p, port)) in targets
        .into_iter()
        .enumerate()
        .cartesian_product(PORTS.into_iter().enumerate())
    {
        let (t, p) = (t as u64, p as u64);
        let scanner = attack.nth(NodeGroup::Sensors, (t * 4 + p) as u32);
        let start = millis(50_000 + t * 5_000 + p * 500);
        let client = UdpClient::new(port)
            .max_packets(3)
            .interval(millis(200))
            .packet_size(64);
        let target = attack.member(segment, 1);
        attack.client(client, scanner, target, start, start + secs(2));
    }
    attack.schedule
}

/// Targets shared by the volumetric attacks on the critical districts
const CRITICAL: [(Segment, NodeGroup); 3] = [
    (Segment::HospitalLan, NodeGroup::HospitalDevices),
    (Segment::PowerLan, NodeGroup::PowerDevices),
    (Segment::FinanceLan, NodeGroup::FinanceDevices),
];

fn ddos(mut attack: Attack<'_>) -> Schedule {
    for (t, (segment, group)) in (0u16..).zip(CRITICAL) {
        let port = 9200 + t;
        attack.sink(group, 0, port, secs(70));
        let t = u32::from(t);
        let target = attack.member(segment, 1);
        for a in 0..3 {
            let client = UdpClient::new(port)
                .max_packets(500)
                .interval(millis(10))
                .packet_size(128);
            let start = secs(80 + 5 * u64::from(t));
            let source = attack.nth(NodeGroup::SmartVehicles, a + t);
            attack.client(client, source, target, start, start + secs(20));
        }
    }
    attack.schedule
}

/// Initial access, lateral movement and exfiltration over three ports
fn apt(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::Core, 0, 8700, secs(60));
    let access = UdpClient::new(8700)
        .max_packets(50)
        .interval(millis(100))
        .packet_size(256);
    let (source, target) = (
        attack.nth(NodeGroup::Sensors, 0),
        attack.member(Segment::Core01, 0),
    );
    attack.client(access, source, target, secs(70), secs(85));

    attack.sink(NodeGroup::OfficeDevices, 5, 8701, secs(90));
    let lateral = UdpClient::new(8701)
        .max_packets(100)
        .interval(millis(50))
        .packet_size(512);
    let (source, target) = (
        attack.nth(NodeGroup::Sensors, 1),
        attack.member(Segment::OfficeLan, 6),
    );
    attack.client(lateral, source, target, secs(95), secs(115));

    attack.sink(NodeGroup::Core, 1, 8702, secs(120));
    let exfiltration = UdpClient::new(8702)
        .max_packets(200)
        .interval(millis(25))
        .packet_size(1024);
    let (source, target) = (
        attack.nth(NodeGroup::OfficeDevices, 4),
        attack.member(Segment::Core01, 1),
    );
    attack.client(exfiltration, source, target, secs(125), secs(150));
    attack.schedule
}

fn ransomware(mut attack: Attack<'_>) -> Schedule {
    for i in 0..4 {
        let port = 8800 + i as u16;
        attack.sink(NodeGroup::BankingServers, i, port, secs(100));
        let client = UdpClient::new(port)
            .max_packets(300)
            .interval(millis(20))
            .packet_size(512);
        let start = secs(110 + 2 * u64::from(i));
        let (source, target) = (
            attack.nth(NodeGroup::OfficeDevices, i + 6),
            attack.member(Segment::FinanceLan, 2 + i),
        );
        attack.client(client, source, target, start, start + secs(20));
    }
    attack.schedule
}

/// Compromised IoT devices calling home to the core
fn botnet(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::Core, 0, 8950, secs(60));
    let target = attack.member(Segment::Core01, 0);
    let groups = [
        NodeGroup::Sensors,
        NodeGroup::SmartVehicles,
        NodeGroup::TrafficSystems,
    ];
    for (c, group) in (0u64..).zip(groups) {
        for d in 0..attack.topology.count(group).min(3) {
            let client = UdpClient::new(8950)
                .max_packets(100)
                .interval(millis(100))
                .packet_size(256);
            let start = secs(70 + 10 * c + 2 * u64::from(d));
            let source = attack.nth(group, d);
            attack.client(client, source, target, start, start + secs(20));
        }
    }
    attack.schedule
}

fn medical(mut attack: Attack<'_>) -> Schedule {
    let target = attack.member(Segment::HospitalLan, 1);
    for i in 0..6 {
        let port = 9000 + i as u16;
        attack.sink(NodeGroup::HospitalDevices, 0, port, secs(90));
        let client = UdpClient::new(port)
            .max_packets(200)
            .interval(millis(50))
            .packet_size(512);
        let start = secs(100 + 3 * u64::from(i));
        let source = attack.nth(NodeGroup::MedicalIot, i);
        attack.client(client, source, target, start, start + secs(20));
    }
    attack.schedule
}

fn grid(mut attack: Attack<'_>) -> Schedule {
    for i in 0..6 {
        let port = 8900 + i as u16;
        attack.sink(NodeGroup::PowerDevices, 0, port, secs(80));
        let client = UdpClient::new(port)
            .max_packets(400)
            .interval(millis(25))
            .packet_size(256);
        let start = secs(90 + 2 * u64::from(i));
        let (source, target) = (
            attack.nth(NodeGroup::SmartVehicles, i),
            attack.member(Segment::SmartGridLan, i + 1),
        );
        attack.client(client, source, target, start, start + secs(20));
    }
    attack.schedule
}

fn supply(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::HospitalDevices, 2, 8750, secs(70));
    let client = UdpClient::new(8750)
        .max_packets(150)
        .interval(millis(100))
        .packet_size(1024);
    let (source, target) = (
        attack.nth(NodeGroup::ResearchCluster, 2),
        attack.member(Segment::HospitalLan, 3),
    );
    attack.client(client, source, target, secs(80), secs(110));
    attack.schedule
}

fn finance(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::Core, 0, 9100, secs(100));
    let client = UdpClient::new(9100)
        .max_packets(500)
        .interval(millis(10))
        .packet_size(1024);
    let (source, target) = (
        attack.nth(NodeGroup::BankingServers, 1),
        attack.member(Segment::Core01, 0),
    );
    attack.client(client, source, target, secs(120), secs(160));
    attack.schedule
}

/// Host sweep over three subnets
///
/// The sweep targets raw addresses, nothing listens on them.
fn recon(mut attack: Attack<'_>) -> Schedule {
    for (subnet, host) in [1u8, 11, 21].into_iter().cartesian_product(1u8..=5) {
        let index = (u32::from(subnet) - 1) / 10 * 5 + u32::from(host) - 1;
        let vehicle = attack.nth(NodeGroup::SmartVehicles, index);
        let client = UdpClient::new(9500 + u16::from(subnet))
            .max_packets(2)
            .interval(millis(500))
            .packet_size(32);
        let start = millis(45_000 + 1_000 * u64::from(subnet) + 200 * u64::from(host));
        let target = Some(Ipv4Addr::new(192, 168, subnet, host));
        attack.client(client, vehicle, target, start, start + secs(2));
    }
    attack.schedule
}

fn mitm6g(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::SmartVehicles, 0, 9600, secs(30));
    let target = attack.station(NodeGroup::SmartVehicles, 0);
    for i in 0..6 {
        let client = UdpClient::new(9600)
            .max_packets(200)
            .interval(millis(250))
            .packet_size(1024);
        let drone = attack.nth(NodeGroup::Drones, i);
        attack.client(client, drone, target, secs(35 + 2 * u64::from(i)), secs(80));
    }
    attack.schedule
}

fn side_channel(mut attack: Attack<'_>) -> Schedule {
    for i in 0..4 {
        let port = 9700 + i as u16;
        attack.sink(NodeGroup::HospitalDevices, i, port, secs(70));
        let client = UdpClient::new(port)
            .max_packets(1000)
            .interval(millis(5))
            .packet_size(32);
        let (source, target) = (
            attack.nth(NodeGroup::Sensors, i),
            attack.member(Segment::HospitalLan, 1 + i),
        );
        attack.client(client, source, target, secs(75), secs(100));
    }
    attack.schedule
}

fn slicing(mut attack: Attack<'_>) -> Schedule {
    for (s, (segment, group)) in (0u16..).zip(CRITICAL) {
        let port = 9800 + s;
        attack.sink(group, 0, port, secs(85));
        let s = u32::from(s);
        let target = attack.member(segment, 1);
        for a in 0..3 {
            let client = UdpClient::new(port)
                .max_packets(500)
                .interval(millis(20))
                .packet_size(256);
            let source = attack.nth(NodeGroup::TrafficSystems, s * 3 + a);
            attack.client(client, source, target, secs(90 + 10 * u64::from(s)), secs(120));
        }
    }
    attack.schedule
}

fn ml_poison(mut attack: Attack<'_>) -> Schedule {
    let target = attack.member(Segment::HospitalLan, 2);
    for i in 0..8 {
        let port = 9900 + i as u16;
        attack.sink(NodeGroup::HospitalDevices, i, port, secs(95));
        let client = UdpClient::new(port)
            .max_packets(300)
            .interval(millis(100))
            .packet_size(2048);
        let source = attack.nth(NodeGroup::ResearchCluster, i);
        attack.client(client, source, target, secs(100 + 2 * u64::from(i)), secs(140));
    }
    attack.schedule
}

/// Flood of the home LAN, then exfiltration from a home device
fn home(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::HomeDevices, 0, 6000, secs(60));
    let target = attack.member(Segment::HomeLan, 1);
    for a in 0..3 {
        let client = UdpClient::new(6000)
            .max_packets(500)
            .interval(millis(20))
            .packet_size(256);
        let source = attack.nth(NodeGroup::SmartVehicles, a);
        attack.client(client, source, target, secs(70 + 2 * u64::from(a)), secs(100));
    }

    attack.sink(NodeGroup::Core, 0, 6001, secs(80));
    let client = UdpClient::new(6001)
        .max_packets(300)
        .interval(millis(50))
        .packet_size(1024);
    let (source, target) = (
        attack.nth(NodeGroup::HomeDevices, 2),
        attack.member(Segment::Core01, 0),
    );
    attack.client(client, source, target, secs(90), secs(120));
    attack.schedule
}

fn university(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::UniversityDevices, 0, 5000, secs(50));
    let target = attack.member(Segment::UniversityLan, 1);
    for a in 0..2 {
        let client = UdpClient::new(5000)
            .max_packets(400)
            .interval(millis(30))
            .packet_size(512);
        let source = attack.nth(NodeGroup::Sensors, a);
        attack.client(client, source, target, secs(60 + 5 * u64::from(a)), secs(90));
    }

    attack.sink(NodeGroup::Core, 1, 5001, secs(70));
    let client = UdpClient::new(5001)
        .max_packets(600)
        .interval(millis(25))
        .packet_size(1024);
    let (source, target) = (
        attack.nth(NodeGroup::ResearchCluster, 2),
        attack.member(Segment::Core01, 1),
    );
    attack.client(client, source, target, secs(80), secs(110));
    attack.schedule
}

/// One compromised vehicle per traffic system
fn edge(mut attack: Attack<'_>) -> Schedule {
    for i in 0..attack.topology.count(NodeGroup::TrafficSystems) {
        let port = 10_000 + i as u16;
        attack.sink(NodeGroup::TrafficSystems, i, port, secs(50));
        let client = UdpClient::new(port)
            .max_packets(400)
            .interval(millis(50))
            .packet_size(512);
        let (source, target) = (
            attack.nth(NodeGroup::SmartVehicles, i),
            attack.station(NodeGroup::TrafficSystems, i),
        );
        attack.client(client, source, target, secs(55 + 3 * u64::from(i)), secs(90));
    }
    attack.schedule
}

fn quantum(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::BankingServers, 0, 10_100, secs(110));
    let client = UdpClient::new(10_100)
        .max_packets(1000)
        .interval(millis(20))
        .packet_size(1024);
    let stop = attack.sim_duration.saturating_sub(secs(10));
    let (source, target) = (
        attack.nth(NodeGroup::OfficeDevices, 8),
        attack.member(Segment::FinanceLan, 2),
    );
    attack.client(client, source, target, secs(120), stop);
    attack.schedule
}

fn gps_spoof(mut attack: Attack<'_>) -> Schedule {
    for i in 0..attack.topology.count(NodeGroup::SmartVehicles) {
        let port = 10_200 + i as u16;
        attack.sink(NodeGroup::SmartVehicles, i, port, secs(40));
        let client = UdpClient::new(port).packet_size(128);
        let (source, target) = (
            attack.nth(NodeGroup::Drones, i),
            attack.station(NodeGroup::SmartVehicles, i),
        );
        attack.client(client, source, target, secs(45), secs(80));
    }
    attack.schedule
}

fn blockchain(mut attack: Attack<'_>) -> Schedule {
    attack.sink(NodeGroup::FinanceDevices, 3, 10_300, secs(125));
    let target = attack.member(Segment::FinanceLan, 4);
    for i in 0..6 {
        let client = UdpClient::new(10_300)
            .max_packets(2000)
            .interval(millis(10))
            .packet_size(256);
        let source = attack.nth(NodeGroup::OfficeDevices, i + 6);
        attack.client(client, source, target, secs(130), secs(170));
    }
    attack.schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_traffic, Label};
    use strum::IntoEnumIterator as _;

    const RUN: Duration = Duration::from_secs(180);

    /// A city with fewer nodes than the attacks pick from
    fn small_city() -> Topology {
        Topology::default()
            .with_count(NodeGroup::SmartVehicles, 2)
            .with_count(NodeGroup::OfficeDevices, 6)
            .with_count(NodeGroup::MedicalIot, 2)
            .with_count(NodeGroup::SmartGrid, 3)
            .with_count(NodeGroup::BankingServers, 1)
    }

    #[test]
    fn test_registry_names() {
        let names: Vec<&'static str> = AttackFamily::iter().map(Into::into).collect();
        assert_eq!(
            names,
            [
                "portscan",
                "ddos",
                "apt",
                "ransomware",
                "botnet",
                "medical",
                "grid",
                "supply",
                "finance",
                "recon",
                "mitm6g",
                "sidechannel",
                "slicing",
                "mlpoison",
                "home",
                "university",
                "edge",
                "quantum",
                "gpsspoof",
                "blockchain",
            ]
        );
        assert_eq!(
            serde_json::to_string(&AttackFamily::GpsSpoof).unwrap(),
            r#""gpsspoof""#
        );
    }

    #[test]
    fn test_every_family_generates_traffic() {
        for topo in [Topology::default(), small_city()] {
            for family in AttackFamily::iter() {
                let schedule = family.generate(&topo, RUN);
                assert!(!schedule.tasks.is_empty(), "{family}");
                assert!(schedule
                    .tasks
                    .iter()
                    .all(|task| task.origin == Origin::Attack(family)));
            }
        }
    }

    #[test]
    fn test_tasks_are_distinct() {
        for topo in [Topology::default(), small_city()] {
            for family in AttackFamily::iter() {
                let schedule = family.generate(&topo, RUN);
                let mut seen = HashSet::new();
                for task in &schedule.tasks {
                    assert!(
                        seen.insert((task.destination_port, task.source, task.start)),
                        "{family}: duplicate {task:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_endpoints_exist() {
        for topo in [Topology::default(), small_city()] {
            let addresses: HashSet<Ipv4Addr> = topo
                .plan()
                .into_iter()
                .flat_map(|plan| plan.interfaces)
                .map(|(_, addr)| addr)
                .collect();
            for family in AttackFamily::iter() {
                let schedule = family.generate(&topo, RUN);
                for task in &schedule.tasks {
                    assert!(
                        task.source.index < topo.count(task.source.group),
                        "{family}: {task:?}"
                    );
                    if family != AttackFamily::Recon {
                        assert!(
                            addresses.contains(&task.destination),
                            "{family}: {task:?}"
                        );
                    }
                }
                for sink in &schedule.sinks {
                    assert!(
                        sink.node.index < topo.count(sink.node.group),
                        "{family}: {sink:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_small_city_wraps_attackers() {
        let topo = small_city();
        let ddos = AttackFamily::Ddos.generate(&topo, RUN);
        // three attackers per target collapse onto the two vehicles
        assert_eq!(ddos.tasks.len(), 6);
        assert_eq!(ddos.sinks.len(), 3);

        let blockchain = AttackFamily::Blockchain.generate(&topo, RUN);
        let sources: HashSet<NodeId> = blockchain.tasks.iter().map(|task| task.source).collect();
        assert_eq!(sources.len(), 6);
    }

    #[test]
    fn test_missing_group_skips_tasks() {
        let topo = Topology::default().with_count(NodeGroup::Drones, 0);
        assert!(AttackFamily::Mitm6g.generate(&topo, RUN).tasks.is_empty());
        assert!(AttackFamily::GpsSpoof.generate(&topo, RUN).tasks.is_empty());

        let topo = Topology::default().with_count(NodeGroup::HospitalDevices, 0);
        let medical = AttackFamily::Medical.generate(&topo, RUN);
        assert!(medical.sinks.is_empty());
        // the first hospital LAN member is now the emergency response center
        assert_eq!(medical.tasks.len(), 6);
    }

    #[test]
    fn test_ports_match_labels() {
        let topo = Topology::default();
        // the recon sweep uses ports outside of the reconnaissance range
        for family in AttackFamily::iter().filter(|family| *family != AttackFamily::Recon) {
            for task in family.generate(&topo, RUN).tasks {
                let class = classify_traffic(task.destination_port, true);
                assert_eq!(class.traffic_type, family.traffic_type(), "{task:?}");
                assert_eq!(class.label, Label::Attack);
            }
        }
    }

    #[test]
    fn test_port_scan_offsets() {
        let topo = Topology::default();
        let schedule = port_scan(Attack::new(&topo, AttackFamily::PortScan, RUN));
        assert!(schedule.sinks.is_empty());
        assert_eq!(schedule.tasks.len(), 12);

        let last = &schedule.tasks[11];
        assert_eq!(last.destination, Ipv4Addr::new(192, 168, 30, 2));
        assert_eq!(last.destination_port, 443);
        assert_eq!(last.start, millis(61_500));
        assert_eq!(last.stop, millis(63_500));
        // scanner 11 wraps around the seven sensors
        assert_eq!(last.source, NodeId::new(NodeGroup::Sensors, 4));
    }

    #[test]
    fn test_recon_sweep() {
        let topo = Topology::default();
        let schedule = AttackFamily::Recon.generate(&topo, RUN);
        assert_eq!(schedule.tasks.len(), 15);
        let ports: HashSet<u16> = schedule
            .tasks
            .iter()
            .map(|task| task.destination_port)
            .collect();
        assert_eq!(ports, HashSet::from([9501, 9511, 9521]));
        let first = &schedule.tasks[0];
        assert_eq!(first.destination, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(first.start, millis(46_200));
    }

    #[test]
    fn test_gps_spoof_follows_topology() {
        let topo = Topology::default().with_count(NodeGroup::SmartVehicles, 3);
        let schedule = AttackFamily::GpsSpoof.generate(&topo, RUN);
        assert_eq!(schedule.tasks.len(), 3);
        assert_eq!(schedule.sinks.len(), 3);
        assert_eq!(
            schedule.tasks[2].destination,
            topo.station(NodeGroup::SmartVehicles, 2)
        );
    }

    #[test]
    fn test_quantum_stop_follows_run() {
        let topo = Topology::default();
        let schedule = AttackFamily::Quantum.generate(&topo, Duration::from_secs(300));
        assert_eq!(schedule.tasks[0].stop, secs(290));
        assert_eq!(schedule.sinks[0].stop, secs(300));
    }
}
