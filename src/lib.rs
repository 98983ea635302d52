//! Shard Redundancy Simulator
//!
//! Models how an erasure-coded file survives on a network of storage nodes:
//! - The file is split into k data shards plus m parity shards
//! - Shards are placed round-robin across the simulated nodes
//! - Nodes fail at random each tick and self-repair below a health threshold
//! - Integrity challenges fire periodically and may be anchored
//! - The file stays recoverable while any k distinct shards are reachable

pub mod node;
pub mod planner;
pub mod shards;
pub mod simulation;

// Re-export commonly used types
pub use node::{NodeStatus, NodeTransition, SimulatedNode};
pub use planner::StoragePlan;
pub use shards::{allocate, ErasureConfig};

pub use simulation::{
    ConfigError, RecoveryStatus, RedundancyConfig, RedundancySimulator, RepairTicket, RunState,
    SimEvent, SimulationController, SimulationRunner, SimulationSnapshot, SimulationStats,
    SimulationTiming, TickOutcome,
};
