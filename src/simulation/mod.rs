//! Redundancy Simulation Module
//!
//! Simulates an erasure-coded file spread over a set of storage nodes:
//!
//! 1. Shards are placed round-robin across the nodes
//! 2. Each tick, healthy nodes fail at random
//! 3. When too few shard slots are reachable, one failed node self-repairs
//! 4. Integrity challenges fire on a fixed cadence
//! 5. Recoverability is derived from the shards held by healthy nodes
//!
//! [`RedundancySimulator`] holds the state. [`SimulationRunner`] drives it
//! on a virtual clock and [`SimulationController`] on the tokio clock.

mod challenge;
mod config;
mod controller;
mod engine;
mod event_queue;
mod events;
mod failure;
pub mod recovery;
mod repair;
mod runner;
mod snapshot;

pub use challenge::{challenge_for_tick, is_challenge_tick, Challenge};
pub use config::{
    ConfigError, RedundancyConfig, SimulationTiming, DEFAULT_REPAIR_DELAY, DEFAULT_TICK_PERIOD,
    FAILURE_RATE_SCALE,
};
pub use controller::SimulationController;
pub use engine::{RedundancySimulator, RunState, SimulationStats, TickOutcome};
pub use event_queue::{EventKey, ScheduledEvent};
pub use events::{EventLog, EventRecord, SimEvent, VerificationMode};
pub use failure::apply_failures;
pub use recovery::RecoveryStatus;
pub use repair::{finish_repair, needs_repair, start_repair, RepairTicket};
pub use runner::{RunnerStats, SimulationRunner};
pub use snapshot::SimulationSnapshot;
