//! Regular city services which run in every scenario

use crate::schedule::{Budget, Origin, Pacing, Protocol, Schedule, SinkTask, TrafficTask, UdpClient};
use crate::topology::{NodeGroup, NodeId, Segment, Topology};
use std::time::Duration;

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Service {
    /// Alerts from the emergency response center
    Emergency,
    MedicalConsultation,
    /// Telemetry of the smart grid controllers
    GridControl,
    /// Bulk TCP transfer of the trading platform
    Trading,
    DroneTelemetry,
}

const fn secs(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

const fn millis(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Schedule of all regular services
pub fn services(topology: &Topology, sim_duration: Duration) -> Schedule {
    let mut schedule = Schedule::default();
    for generate in [
        emergency as fn(&Topology, Duration) -> Schedule,
        medical_consultation,
        grid_control,
        trading,
        drone_telemetry,
    ] {
        schedule += generate(topology, sim_duration);
    }
    schedule
}

fn emergency(topology: &Topology, sim_duration: Duration) -> Schedule {
    let origin = Origin::Normal(Service::Emergency);
    let center = NodeId::new(NodeGroup::EmergencyResponse, 0);
    let sinks = vec![SinkTask::udp(origin, center, 8100, secs(10), sim_duration)];

    let traffic = UdpClient::new(8101).max_packets(50).packet_size(512);
    let power = UdpClient::new(8102);
    let tasks = vec![
        traffic.task(
            origin,
            center,
            topology.station(NodeGroup::TrafficSystems, 0),
            secs(60),
            secs(90),
        ),
        power.task(
            origin,
            center,
            topology.interface(Segment::PowerLan, 1),
            secs(60),
            secs(90),
        ),
    ];
    Schedule { sinks, tasks }
}

fn medical_consultation(topology: &Topology, sim_duration: Duration) -> Schedule {
    let origin = Origin::Normal(Service::MedicalConsultation);
    let sinks = vec![SinkTask::udp(
        origin,
        NodeId::new(NodeGroup::Cdn, 0),
        8200,
        secs(20),
        sim_duration,
    )];
    let tasks = vec![
        UdpClient::new(8200)
            .max_packets(2000)
            .interval(millis(50))
            .packet_size(1400)
            .task(
                origin,
                NodeId::new(NodeGroup::HospitalDevices, 0),
                topology.interface(Segment::Cdn0, 0),
                secs(30),
                secs(120),
            ),
    ];
    Schedule { sinks, tasks }
}

fn grid_control(topology: &Topology, sim_duration: Duration) -> Schedule {
    let origin = Origin::Normal(Service::GridControl);
    let mut schedule = Schedule::default();
    for i in 0..topology.count(NodeGroup::SmartGrid) {
        let port = 8300 + i as u16;
        schedule.sinks.push(SinkTask::udp(
            origin,
            NodeId::new(NodeGroup::PowerDevices, 0),
            port,
            secs(5),
            sim_duration,
        ));
        schedule.tasks.push(
            UdpClient::new(port)
                .max_packets(1000)
                .interval(millis(100))
                .packet_size(200)
                .task(
                    origin,
                    NodeId::new(NodeGroup::SmartGrid, i),
                    topology.interface(Segment::PowerLan, 1),
                    secs(10 + u64::from(i)),
                    sim_duration,
                ),
        );
    }
    schedule
}

fn trading(topology: &Topology, sim_duration: Duration) -> Schedule {
    let origin = Origin::Normal(Service::Trading);
    let sinks = vec![SinkTask {
        origin,
        node: NodeId::new(NodeGroup::BankingServers, 0),
        port: 8400,
        protocol: Protocol::Tcp,
        start: secs(1),
        stop: sim_duration,
    }];
    let tasks = vec![TrafficTask {
        origin,
        source: NodeId::new(NodeGroup::FinanceDevices, 0),
        destination: topology.interface(Segment::FinanceLan, 2),
        destination_port: 8400,
        protocol: Protocol::Tcp,
        budget: Budget::MaxBytes(50_000_000),
        pacing: Pacing::Saturate,
        packet_size: 512,
        start: secs(25),
        stop: sim_duration.saturating_sub(secs(20)),
    }];
    Schedule { sinks, tasks }
}

fn drone_telemetry(topology: &Topology, sim_duration: Duration) -> Schedule {
    let origin = Origin::Normal(Service::DroneTelemetry);
    let mut schedule = Schedule::default();
    for i in 0..topology.count(NodeGroup::Drones) {
        let port = 8500 + i as u16;
        schedule.sinks.push(SinkTask::udp(
            origin,
            NodeId::new(NodeGroup::HospitalDevices, 0),
            port,
            secs(30),
            sim_duration,
        ));
        schedule.tasks.push(
            UdpClient::new(port)
                .max_packets(800)
                .interval(millis(125))
                .packet_size(1200)
                .task(
                    origin,
                    NodeId::new(NodeGroup::Drones, i),
                    topology.interface(Segment::HospitalLan, 1),
                    secs(40 + 5 * u64::from(i)),
                    sim_duration.saturating_sub(secs(10)),
                ),
        );
    }
    schedule
}
