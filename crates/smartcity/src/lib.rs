//! Traffic model of the smart-city network.
//!
//! The crate knows which districts exist, how their subnets are laid out, which traffic the
//! simulation should generate for a scenario, and how an observed flow is labeled afterwards.
//! It does not run the simulation itself.

#![deny(unused_import_braces, unused_qualifications)]

pub mod classify;
pub mod families;
pub mod normal;
pub mod schedule;
pub mod topology;

pub use classify::{classify_traffic, District, DistrictTable, Label, TrafficClass, TrafficType};
pub use families::AttackFamily;
pub use schedule::{compile, Scenario, Schedule, SinkTask, TrafficTask};
pub use topology::{NodeGroup, NodeId, Segment, Topology};
