//! Static description of the smart-city network
//!
//! The simulation engine builds the actual network from this description.
//! Addresses are handed out sequentially per segment, starting with `.1` for the first member.

use crate::District;
use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;
use strum::{EnumCount as _, IntoEnumIterator as _};

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
)]
pub enum NodeGroup {
    /// Primary, secondary and emergency core routers
    Core,
    Cdn,
    Dns,
    HomeGateway,
    OfficeGateway,
    UniversityGateway,
    IotGateway,
    HospitalGateway,
    PowerGateway,
    FinanceGateway,
    HomeDevices,
    OfficeDevices,
    UniversityDevices,
    ResearchCluster,
    TrafficSystems,
    SmartVehicles,
    Drones,
    Sensors,
    HospitalDevices,
    MedicalIot,
    EmergencyResponse,
    PowerDevices,
    SmartGrid,
    PowerPlants,
    FinanceDevices,
    BankingServers,
    AtmNetwork,
}

impl NodeGroup {
    fn default_count(self) -> u32 {
        match self {
            NodeGroup::Core => 3,
            NodeGroup::Cdn | NodeGroup::Dns => 2,
            NodeGroup::HomeGateway
            | NodeGroup::OfficeGateway
            | NodeGroup::UniversityGateway
            | NodeGroup::IotGateway
            | NodeGroup::HospitalGateway
            | NodeGroup::PowerGateway
            | NodeGroup::FinanceGateway => 1,
            NodeGroup::HomeDevices => 8,
            NodeGroup::OfficeDevices => 12,
            NodeGroup::UniversityDevices => 10,
            NodeGroup::ResearchCluster => 5,
            NodeGroup::TrafficSystems => 6,
            NodeGroup::SmartVehicles => 8,
            NodeGroup::Drones => 4,
            NodeGroup::Sensors => 7,
            NodeGroup::HospitalDevices => 8,
            NodeGroup::MedicalIot => 6,
            NodeGroup::EmergencyResponse => 2,
            NodeGroup::PowerDevices => 4,
            NodeGroup::SmartGrid => 6,
            NodeGroup::PowerPlants => 2,
            NodeGroup::FinanceDevices => 4,
            NodeGroup::BankingServers => 4,
            NodeGroup::AtmNetwork => 2,
        }
    }

    /// District the group belongs to
    pub fn district(self) -> District {
        match self {
            NodeGroup::Core | NodeGroup::Cdn | NodeGroup::Dns => District::Core,
            NodeGroup::HomeGateway | NodeGroup::HomeDevices => District::Home,
            NodeGroup::OfficeGateway | NodeGroup::OfficeDevices => District::Office,
            NodeGroup::UniversityGateway | NodeGroup::UniversityDevices => District::University,
            NodeGroup::ResearchCluster => District::UniversityResearch,
            NodeGroup::IotGateway
            | NodeGroup::TrafficSystems
            | NodeGroup::SmartVehicles
            | NodeGroup::Drones
            | NodeGroup::Sensors => District::Iot,
            NodeGroup::HospitalGateway
            | NodeGroup::HospitalDevices
            | NodeGroup::MedicalIot
            | NodeGroup::EmergencyResponse => District::Hospital,
            NodeGroup::PowerGateway
            | NodeGroup::PowerDevices
            | NodeGroup::SmartGrid
            | NodeGroup::PowerPlants => District::PowerGrid,
            NodeGroup::FinanceGateway
            | NodeGroup::FinanceDevices
            | NodeGroup::BankingServers
            | NodeGroup::AtmNetwork => District::Finance,
        }
    }

    /// Routers and gateways, everything which is not an end device
    pub fn is_infrastructure(self) -> bool {
        matches!(
            self,
            NodeGroup::Core
                | NodeGroup::Cdn
                | NodeGroup::Dns
                | NodeGroup::HomeGateway
                | NodeGroup::OfficeGateway
                | NodeGroup::UniversityGateway
                | NodeGroup::IotGateway
                | NodeGroup::HospitalGateway
                | NodeGroup::PowerGateway
                | NodeGroup::FinanceGateway
        )
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId {
    pub group: NodeGroup,
    pub index: u32,
}

impl NodeId {
    pub const fn new(group: NodeGroup, index: u32) -> Self {
        Self { group, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.group, self.index)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display)]
pub enum LinkClass {
    Backbone,
    Ultra6G,
    Cellular6G,
    Cellular5G,
    Fiber,
    HomeFiber,
    Csma,
    CsmaHighSpeed,
    /// 802.11ax, shared medium without a fixed rate
    Wifi,
}

impl LinkClass {
    pub fn data_rate_bps(self) -> Option<u64> {
        const GBPS: u64 = 1_000_000_000;
        match self {
            LinkClass::Backbone => Some(200 * GBPS),
            LinkClass::Ultra6G => Some(100 * GBPS),
            LinkClass::Cellular6G => Some(50 * GBPS),
            LinkClass::Cellular5G => Some(20 * GBPS),
            LinkClass::Fiber | LinkClass::CsmaHighSpeed => Some(10 * GBPS),
            LinkClass::HomeFiber => Some(5 * GBPS),
            LinkClass::Csma => Some(GBPS),
            LinkClass::Wifi => None,
        }
    }

    pub fn delay(self) -> Option<Duration> {
        match self {
            LinkClass::Backbone => Some(Duration::from_micros(100)),
            LinkClass::Ultra6G => Some(Duration::from_micros(200)),
            LinkClass::Cellular6G | LinkClass::CsmaHighSpeed => Some(Duration::from_micros(500)),
            LinkClass::Cellular5G | LinkClass::Csma => Some(Duration::from_millis(2)),
            LinkClass::Fiber => Some(Duration::from_millis(5)),
            LinkClass::HomeFiber => Some(Duration::from_millis(8)),
            LinkClass::Wifi => None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum Attachment {
    Node(NodeGroup, u32),
    Group(NodeGroup),
}

/// One addressed subnet, either a point-to-point link or a shared LAN
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Segment {
    Core01,
    Core02,
    Core12,
    Cdn0,
    Cdn1,
    Dns0,
    Dns1,
    HomeUplink,
    OfficeUplink,
    UniversityUplink,
    IotUplink,
    HospitalUplink,
    PowerUplink,
    FinanceUplink,
    HomeLan,
    OfficeLan,
    UniversityLan,
    ResearchLan,
    /// All wireless IoT stations share one subnet behind the IoT access point
    Wireless,
    HospitalLan,
    MedicalIotLan,
    PowerLan,
    SmartGridLan,
    FinanceLan,
}

impl Segment {
    fn base(self) -> (Ipv4Addr, u8) {
        match self {
            Segment::Core01 => (Ipv4Addr::new(10, 0, 0, 0), 24),
            Segment::Core02 => (Ipv4Addr::new(10, 0, 1, 0), 24),
            Segment::Core12 => (Ipv4Addr::new(10, 0, 2, 0), 24),
            Segment::Cdn0 => (Ipv4Addr::new(10, 1, 0, 0), 24),
            Segment::Cdn1 => (Ipv4Addr::new(10, 1, 1, 0), 24),
            Segment::Dns0 => (Ipv4Addr::new(10, 2, 0, 0), 24),
            Segment::Dns1 => (Ipv4Addr::new(10, 2, 1, 0), 24),
            Segment::HomeUplink => (Ipv4Addr::new(172, 16, 1, 0), 30),
            Segment::OfficeUplink => (Ipv4Addr::new(172, 16, 2, 0), 30),
            Segment::UniversityUplink => (Ipv4Addr::new(172, 16, 3, 0), 30),
            Segment::IotUplink => (Ipv4Addr::new(172, 16, 5, 0), 30),
            Segment::HospitalUplink => (Ipv4Addr::new(172, 16, 10, 0), 30),
            Segment::PowerUplink => (Ipv4Addr::new(172, 16, 20, 0), 30),
            Segment::FinanceUplink => (Ipv4Addr::new(172, 16, 30, 0), 30),
            Segment::HomeLan => (Ipv4Addr::new(192, 168, 1, 0), 24),
            Segment::OfficeLan => (Ipv4Addr::new(192, 168, 2, 0), 24),
            Segment::UniversityLan => (Ipv4Addr::new(192, 168, 3, 0), 24),
            Segment::ResearchLan => (Ipv4Addr::new(192, 168, 4, 0), 24),
            Segment::Wireless => (Ipv4Addr::new(192, 168, 50, 0), 24),
            Segment::HospitalLan => (Ipv4Addr::new(192, 168, 10, 0), 24),
            Segment::MedicalIotLan => (Ipv4Addr::new(192, 168, 11, 0), 24),
            Segment::PowerLan => (Ipv4Addr::new(192, 168, 20, 0), 24),
            Segment::SmartGridLan => (Ipv4Addr::new(192, 168, 21, 0), 24),
            Segment::FinanceLan => (Ipv4Addr::new(192, 168, 30, 0), 24),
        }
    }

    pub fn network(self) -> Ipv4Network {
        let (addr, prefix) = self.base();
        Ipv4Network::new(addr, prefix).expect("Segment prefixes are at most 32 bits")
    }

    pub fn link_class(self) -> LinkClass {
        match self {
            Segment::Core01 | Segment::Core02 | Segment::Core12 => LinkClass::Backbone,
            Segment::Cdn0
            | Segment::Cdn1
            | Segment::Dns0
            | Segment::Dns1
            | Segment::OfficeUplink => LinkClass::Fiber,
            Segment::HomeUplink => LinkClass::HomeFiber,
            Segment::UniversityUplink => LinkClass::Cellular5G,
            Segment::IotUplink => LinkClass::Cellular6G,
            Segment::HospitalUplink | Segment::PowerUplink | Segment::FinanceUplink => {
                LinkClass::Ultra6G
            }
            Segment::HomeLan
            | Segment::OfficeLan
            | Segment::UniversityLan
            | Segment::SmartGridLan => LinkClass::Csma,
            Segment::ResearchLan
            | Segment::HospitalLan
            | Segment::MedicalIotLan
            | Segment::PowerLan
            | Segment::FinanceLan => LinkClass::CsmaHighSpeed,
            Segment::Wireless => LinkClass::Wifi,
        }
    }

    /// Members in interface order
    fn attachments(self) -> &'static [Attachment] {
        use Attachment::{Group, Node};
        use NodeGroup::*;

        match self {
            Segment::Core01 => &[Node(Core, 0), Node(Core, 1)],
            Segment::Core02 => &[Node(Core, 0), Node(Core, 2)],
            Segment::Core12 => &[Node(Core, 1), Node(Core, 2)],
            Segment::Cdn0 => &[Node(Cdn, 0), Node(Core, 0)],
            Segment::Cdn1 => &[Node(Cdn, 1), Node(Core, 1)],
            Segment::Dns0 => &[Node(Dns, 0), Node(Core, 0)],
            Segment::Dns1 => &[Node(Dns, 1), Node(Core, 1)],
            Segment::HomeUplink => &[Node(HomeGateway, 0), Node(Core, 0)],
            Segment::OfficeUplink => &[Node(OfficeGateway, 0), Node(Core, 0)],
            Segment::UniversityUplink => &[Node(UniversityGateway, 0), Node(Core, 1)],
            Segment::IotUplink => &[Node(IotGateway, 0), Node(Core, 0)],
            Segment::HospitalUplink => &[Node(HospitalGateway, 0), Node(Core, 1)],
            Segment::PowerUplink => &[Node(PowerGateway, 0), Node(Core, 2)],
            Segment::FinanceUplink => &[Node(FinanceGateway, 0), Node(Core, 2)],
            Segment::HomeLan => &[Group(HomeGateway), Group(HomeDevices)],
            Segment::OfficeLan => &[Group(OfficeGateway), Group(OfficeDevices)],
            Segment::UniversityLan => &[Group(UniversityGateway), Group(UniversityDevices)],
            Segment::ResearchLan => &[Group(UniversityGateway), Group(ResearchCluster)],
            Segment::Wireless => &[
                Group(IotGateway),
                Group(TrafficSystems),
                Group(SmartVehicles),
                Group(Drones),
                Group(Sensors),
            ],
            Segment::HospitalLan => &[
                Group(HospitalGateway),
                Group(HospitalDevices),
                Group(EmergencyResponse),
            ],
            Segment::MedicalIotLan => &[Group(HospitalGateway), Group(MedicalIot)],
            Segment::PowerLan => &[
                Group(PowerGateway),
                Group(PowerDevices),
                Group(PowerPlants),
            ],
            Segment::SmartGridLan => &[Group(PowerGateway), Group(SmartGrid)],
            Segment::FinanceLan => &[
                Group(FinanceGateway),
                Group(FinanceDevices),
                Group(BankingServers),
                Group(AtmNetwork),
            ],
        }
    }
}

/// Addressing of a single segment, as handed to the simulation engine
#[derive(Clone, Debug, serde::Serialize)]
pub struct SegmentPlan {
    pub segment: Segment,
    pub network: Ipv4Network,
    pub link: LinkClass,
    pub interfaces: Vec<(NodeId, Ipv4Addr)>,
}

/// Node counts of the city
///
/// Passed by reference wherever nodes or addresses need to be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    counts: [u32; NodeGroup::COUNT],
}

impl Default for Topology {
    fn default() -> Self {
        let mut counts = [0; NodeGroup::COUNT];
        for group in NodeGroup::iter() {
            counts[group as usize] = group.default_count();
        }
        Self { counts }
    }
}

impl Topology {
    pub fn with_count(mut self, group: NodeGroup, count: u32) -> Self {
        self.counts[group as usize] = count;
        self
    }

    pub fn count(&self, group: NodeGroup) -> u32 {
        self.counts[group as usize]
    }

    pub fn end_devices(&self) -> u32 {
        NodeGroup::iter()
            .filter(|group| !group.is_infrastructure())
            .map(|group| self.count(group))
            .sum()
    }

    pub fn members(&self, segment: Segment) -> Vec<NodeId> {
        segment
            .attachments()
            .iter()
            .flat_map(|attachment| -> Vec<NodeId> {
                match *attachment {
                    Attachment::Node(group, index) => vec![NodeId::new(group, index)],
                    Attachment::Group(group) => (0..self.count(group))
                        .map(|index| NodeId::new(group, index))
                        .collect(),
                }
            })
            .collect()
    }

    /// Address of the `interface`-th member of the segment
    pub fn interface(&self, segment: Segment, interface: u32) -> Ipv4Addr {
        let network = u32::from(segment.base().0);
        Ipv4Addr::from(network + interface + 1)
    }

    pub fn interface_of(&self, segment: Segment, node: NodeId) -> Option<Ipv4Addr> {
        self.members(segment)
            .iter()
            .position(|member| *member == node)
            .map(|position| self.interface(segment, position as u32))
    }

    /// Address of a wireless station
    ///
    /// `group` must be one of the groups attached to the [`Segment::Wireless`] segment.
    pub fn station(&self, group: NodeGroup, index: u32) -> Ipv4Addr {
        let offset: u32 = Segment::Wireless
            .attachments()
            .iter()
            .take_while(|attachment| !matches!(attachment, Attachment::Group(member) if *member == group))
            .map(|attachment| match *attachment {
                Attachment::Group(member) => self.count(member),
                Attachment::Node(..) => 1,
            })
            .sum();
        self.interface(Segment::Wireless, offset + index)
    }

    pub fn plan(&self) -> Vec<SegmentPlan> {
        Segment::iter()
            .map(|segment| SegmentPlan {
                segment,
                network: segment.network(),
                link: segment.link_class(),
                interfaces: self
                    .members(segment)
                    .into_iter()
                    .enumerate()
                    .map(|(position, node)| (node, self.interface(segment, position as u32)))
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DistrictTable;

    #[test]
    fn test_reference_city_has_98_end_devices() {
        assert_eq!(Topology::default().end_devices(), 98);
    }

    #[test]
    fn test_lan_interfaces_start_after_gateway() {
        let topo = Topology::default();
        assert_eq!(
            topo.interface(Segment::HospitalLan, 1),
            Ipv4Addr::new(192, 168, 10, 2)
        );
        assert_eq!(
            topo.members(Segment::HospitalLan)[1],
            NodeId::new(NodeGroup::HospitalDevices, 0)
        );
        assert_eq!(
            topo.interface_of(
                Segment::HospitalLan,
                NodeId::new(NodeGroup::EmergencyResponse, 0)
            ),
            Some(Ipv4Addr::new(192, 168, 10, 10))
        );
        assert_eq!(
            topo.interface(Segment::Core01, 0),
            Ipv4Addr::new(10, 0, 0, 1)
        );
    }

    #[test]
    fn test_wireless_stations_share_one_subnet() {
        let topo = Topology::default();
        assert_eq!(
            topo.station(NodeGroup::TrafficSystems, 0),
            Ipv4Addr::new(192, 168, 50, 2)
        );
        assert_eq!(
            topo.station(NodeGroup::SmartVehicles, 0),
            Ipv4Addr::new(192, 168, 50, 8)
        );
        assert_eq!(
            topo.station(NodeGroup::Sensors, 6),
            Ipv4Addr::new(192, 168, 50, 26)
        );
        assert_eq!(
            topo.interface_of(Segment::Wireless, NodeId::new(NodeGroup::Drones, 3)),
            Some(topo.station(NodeGroup::Drones, 3))
        );
    }

    #[test]
    fn test_plan_addresses_stay_inside_segment() {
        for plan in Topology::default().plan() {
            for (node, addr) in &plan.interfaces {
                assert!(
                    plan.network.contains(*addr),
                    "{node} got {addr} outside of {}",
                    plan.network
                );
            }
        }
    }

    /// The two district tables disagree for the wireless and research subnets.
    #[test]
    fn test_district_tables_against_address_plan() {
        let topo = Topology::default();
        for plan in topo.plan() {
            for (node, addr) in plan.interfaces {
                if node.group.is_infrastructure() {
                    continue;
                }

                let export = DistrictTable::Export.classify(addr);
                if plan.segment == Segment::Wireless {
                    assert_eq!(export, District::Unknown, "{node} {addr}");
                } else {
                    assert_eq!(export, node.group.district(), "{node} {addr}");
                }

                let live = DistrictTable::Live.classify(addr);
                if plan.segment == Segment::ResearchLan {
                    assert_eq!(live, District::Core, "{node} {addr}");
                } else {
                    assert_eq!(live, node.group.district(), "{node} {addr}");
                }
            }
        }
    }
}
