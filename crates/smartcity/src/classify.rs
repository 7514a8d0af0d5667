//! Labeling rules for observed flows
//!
//! A flow is attributed to a district by its source address and to a traffic type by its
//! destination port. All tables are ordered and the first matching entry wins.

use ipnetwork::Ipv4Network;
use once_cell::sync::Lazy;
use std::net::Ipv4Addr;

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
    strum::IntoStaticStr,
)]
pub enum District {
    Home,
    Office,
    University,
    #[strum(serialize = "University-Research")]
    UniversityResearch,
    #[strum(serialize = "IoT")]
    Iot,
    Hospital,
    PowerGrid,
    Finance,
    Core,
    Unknown,
}

/// Which of the two subnet tables to consult
///
/// The live verdict path and the dataset export use different address plans.
/// They disagree on the wireless subnet, the research cluster and the fallback district.
/// Datasets produced with the export table have to stay comparable, so neither is changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DistrictTable {
    /// Used when querying the oracle, falls back to [`District::Core`]
    Live,
    /// Used for dataset rows, falls back to [`District::Unknown`]
    Export,
}

fn prefix_table(entries: &[(&str, District)]) -> Vec<(Ipv4Network, District)> {
    entries
        .iter()
        .map(|&(prefix, district)| {
            let network: Ipv4Network = prefix
                .parse()
                .unwrap_or_else(|err| panic!("Invalid prefix {prefix} in district table: {err}"));
            (network, district)
        })
        .collect()
}

static LIVE_TABLE: Lazy<Vec<(Ipv4Network, District)>> = Lazy::new(|| {
    prefix_table(&[
        ("192.168.50.0/24", District::Iot),
        ("192.168.10.0/24", District::Hospital),
        ("192.168.11.0/24", District::Hospital),
        ("192.168.20.0/24", District::PowerGrid),
        ("192.168.21.0/24", District::PowerGrid),
        ("192.168.30.0/24", District::Finance),
        ("192.168.1.0/24", District::Home),
        ("192.168.2.0/24", District::Office),
        ("192.168.3.0/24", District::University),
    ])
});

static EXPORT_TABLE: Lazy<Vec<(Ipv4Network, District)>> = Lazy::new(|| {
    prefix_table(&[
        ("192.168.1.0/24", District::Home),
        ("192.168.2.0/24", District::Office),
        ("192.168.3.0/24", District::University),
        ("192.168.4.0/24", District::UniversityResearch),
        ("192.168.5.0/24", District::Iot),
        ("192.168.6.0/24", District::Iot),
        ("192.168.7.0/24", District::Iot),
        ("192.168.8.0/24", District::Iot),
        ("192.168.10.0/24", District::Hospital),
        ("192.168.11.0/24", District::Hospital),
        ("192.168.20.0/24", District::PowerGrid),
        ("192.168.21.0/24", District::PowerGrid),
        ("192.168.30.0/24", District::Finance),
        ("10.0.0.0/8", District::Core),
    ])
});

impl DistrictTable {
    fn entries(self) -> &'static [(Ipv4Network, District)] {
        match self {
            DistrictTable::Live => &LIVE_TABLE,
            DistrictTable::Export => &EXPORT_TABLE,
        }
    }

    pub fn fallback(self) -> District {
        match self {
            DistrictTable::Live => District::Core,
            DistrictTable::Export => District::Unknown,
        }
    }

    pub fn classify(self, addr: Ipv4Addr) -> District {
        self.entries()
            .iter()
            .find(|(network, _)| network.contains(addr))
            .map(|&(_, district)| district)
            .unwrap_or_else(|| self.fallback())
    }
}

/// Ground truth of a flow: `0` for benign and `1` for attack traffic
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde_repr::Serialize_repr,
    serde_repr::Deserialize_repr,
)]
#[repr(u8)]
pub enum Label {
    Benign = 0,
    Attack = 1,
}

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
    strum::IntoStaticStr,
)]
pub enum TrafficType {
    Emergency,
    Medical,
    PowerGrid,
    Financial,
    Surveillance,
    Regular,

    UniversityAttack,
    HomeAttack,
    #[strum(serialize = "APT")]
    Apt,
    SupplyChain,
    Ransomware,
    GridAttack,
    Botnet,
    MedicalHijack,
    DataExfiltration,
    #[strum(serialize = "DDoS")]
    Ddos,
    PortScan,
    Reconnaissance,
    #[strum(serialize = "MiTM6G")]
    Mitm6G,
    SideChannel,
    NetworkSlicing,
    #[strum(serialize = "MLPoisoning")]
    MlPoisoning,
    EdgeCompromise,
    QuantumAttack,
    #[strum(serialize = "GPSSpoofing")]
    GpsSpoofing,
    BlockchainAttack,
}

impl TrafficType {
    pub fn label(self) -> Label {
        match self {
            TrafficType::Emergency
            | TrafficType::Medical
            | TrafficType::PowerGrid
            | TrafficType::Financial
            | TrafficType::Surveillance
            | TrafficType::Regular => Label::Benign,
            _ => Label::Attack,
        }
    }
}

/// Inclusive range of destination ports mapping to one traffic type
#[derive(Copy, Clone, Debug)]
pub struct PortRule {
    pub low: u16,
    pub high: u16,
    pub traffic_type: TrafficType,
}

impl PortRule {
    const fn range(low: u16, high: u16, traffic_type: TrafficType) -> Self {
        Self {
            low,
            high,
            traffic_type,
        }
    }

    const fn port(port: u16, traffic_type: TrafficType) -> Self {
        Self::range(port, port, traffic_type)
    }

    pub fn matches(&self, port: u16) -> bool {
        (self.low..=self.high).contains(&port)
    }
}

/// Port ranges owned by the attack families
///
/// Ranges are pairwise disjoint.
pub static ATTACK_RULES: [PortRule; 23] = [
    PortRule::range(5000, 5010, TrafficType::UniversityAttack),
    PortRule::range(6000, 6010, TrafficType::HomeAttack),
    PortRule::range(8700, 8702, TrafficType::Apt),
    PortRule::range(8750, 8799, TrafficType::SupplyChain),
    PortRule::range(8800, 8849, TrafficType::Ransomware),
    PortRule::range(8900, 8949, TrafficType::GridAttack),
    PortRule::range(8950, 8999, TrafficType::Botnet),
    PortRule::range(9000, 9099, TrafficType::MedicalHijack),
    PortRule::range(9100, 9199, TrafficType::DataExfiltration),
    PortRule::range(9200, 9299, TrafficType::Ddos),
    PortRule::port(21, TrafficType::PortScan),
    PortRule::port(22, TrafficType::PortScan),
    PortRule::port(80, TrafficType::PortScan),
    PortRule::port(443, TrafficType::PortScan),
    PortRule::range(9500, 9510, TrafficType::Reconnaissance),
    PortRule::port(9600, TrafficType::Mitm6G),
    PortRule::range(9700, 9703, TrafficType::SideChannel),
    PortRule::range(9800, 9802, TrafficType::NetworkSlicing),
    PortRule::range(9900, 9907, TrafficType::MlPoisoning),
    PortRule::range(10000, 10005, TrafficType::EdgeCompromise),
    PortRule::port(10100, TrafficType::QuantumAttack),
    PortRule::range(10200, 10207, TrafficType::GpsSpoofing),
    PortRule::port(10300, TrafficType::BlockchainAttack),
];

/// Port ranges of the regular city services
pub static NORMAL_RULES: [PortRule; 5] = [
    PortRule::range(8100, 8199, TrafficType::Emergency),
    PortRule::range(8200, 8299, TrafficType::Medical),
    PortRule::range(8300, 8399, TrafficType::PowerGrid),
    PortRule::range(8400, 8499, TrafficType::Financial),
    PortRule::range(8500, 8599, TrafficType::Surveillance),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TrafficClass {
    pub traffic_type: TrafficType,
    pub label: Label,
}

impl From<TrafficType> for TrafficClass {
    fn from(traffic_type: TrafficType) -> Self {
        Self {
            traffic_type,
            label: traffic_type.label(),
        }
    }
}

fn first_match(rules: &[PortRule], port: u16) -> Option<TrafficType> {
    rules
        .iter()
        .find(|rule| rule.matches(port))
        .map(|rule| rule.traffic_type)
}

/// Classify a flow by its destination port
///
/// Attack ports are only recognized if the run generated attacks at all.
/// Everything else falls back to the service table and finally to [`TrafficType::Regular`].
pub fn classify_traffic(dst_port: u16, attacks_enabled: bool) -> TrafficClass {
    let attack = if attacks_enabled {
        first_match(&ATTACK_RULES, dst_port)
    } else {
        None
    };
    attack
        .or_else(|| first_match(&NORMAL_RULES, dst_port))
        .unwrap_or(TrafficType::Regular)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools as _;

    #[test]
    fn test_iot_subnet() {
        for host in 0..=255 {
            let addr = Ipv4Addr::new(192, 168, 50, host);
            assert_eq!(DistrictTable::Live.classify(addr), District::Iot);
        }
    }

    #[test]
    fn test_hospital_subnets() {
        for table in [DistrictTable::Live, DistrictTable::Export] {
            for host in 0..=255 {
                for subnet in [10, 11] {
                    let addr = Ipv4Addr::new(192, 168, subnet, host);
                    assert_eq!(table.classify(addr), District::Hospital, "{addr}");
                }
            }
        }
    }

    #[test]
    fn test_core_and_fallbacks() {
        let core = Ipv4Addr::new(10, 200, 3, 4);
        assert_eq!(DistrictTable::Export.classify(core), District::Core);
        assert_eq!(DistrictTable::Live.classify(core), District::Core);

        let outside = Ipv4Addr::new(172, 16, 10, 1);
        assert_eq!(DistrictTable::Export.classify(outside), District::Unknown);
        assert_eq!(DistrictTable::Live.classify(outside), District::Core);
    }

    #[test]
    fn test_prefix_is_not_a_string_prefix() {
        // 192.168.10.x must not be mistaken for 192.168.1.x
        assert_eq!(
            DistrictTable::Live.classify(Ipv4Addr::new(192, 168, 10, 1)),
            District::Hospital
        );
        assert_eq!(
            DistrictTable::Export.classify(Ipv4Addr::new(192, 168, 1, 10)),
            District::Home
        );
    }

    #[test]
    fn test_district_names() {
        assert_eq!(District::UniversityResearch.to_string(), "University-Research");
        assert_eq!(District::Iot.to_string(), "IoT");
        assert_eq!("PowerGrid".parse::<District>().ok(), Some(District::PowerGrid));
    }

    #[test]
    fn test_ddos_range() {
        for port in 9200..=9299 {
            assert_eq!(
                classify_traffic(port, true),
                TrafficClass {
                    traffic_type: TrafficType::Ddos,
                    label: Label::Attack,
                }
            );
        }
        assert_eq!(TrafficType::Ddos.to_string(), "DDoS");
    }

    #[test]
    fn test_attack_ports_are_benign_without_attacks() {
        for port in [21, 80, 5000, 9201, 9600, 10300] {
            assert_eq!(
                classify_traffic(port, false),
                TrafficClass {
                    traffic_type: TrafficType::Regular,
                    label: Label::Benign,
                }
            );
        }
    }

    #[test]
    fn test_service_ranges_ignore_attack_flag() {
        for attacks_enabled in [false, true] {
            for port in 8300..=8399 {
                let class = classify_traffic(port, attacks_enabled);
                assert_eq!(class.traffic_type, TrafficType::PowerGrid);
                assert_eq!(class.label, Label::Benign);
            }
        }
        assert_eq!(classify_traffic(8150, true).traffic_type, TrafficType::Emergency);
        assert_eq!(classify_traffic(8599, true).traffic_type, TrafficType::Surveillance);
        assert_eq!(classify_traffic(8600, true).traffic_type, TrafficType::Regular);
        assert_eq!(classify_traffic(53, true).traffic_type, TrafficType::Regular);
    }

    #[test]
    fn test_attack_rules_are_disjoint() {
        for (a, b) in ATTACK_RULES.iter().tuple_combinations() {
            assert!(
                a.high < b.low || b.high < a.low,
                "{:?} overlaps with {:?}",
                a,
                b
            );
        }
        for rule in &ATTACK_RULES {
            assert_eq!(rule.traffic_type.label(), Label::Attack);
            assert!(rule.low <= rule.high);
        }
    }

    #[test]
    fn test_label_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Label::Attack).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Label::Benign).unwrap(), "0");
    }
}
