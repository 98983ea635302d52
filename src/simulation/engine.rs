//! Redundancy simulator state machine
//!
//! Owns the node set and everything derived from one tick to the next.
//! It has no timers of its own: a driver calls [`RedundancySimulator::tick`]
//! on the tick period and hands every returned [`RepairTicket`] back via
//! [`RedundancySimulator::complete_repair`] once the repair delay elapses.
//!
//! Every reset or topology change bumps the generation, so tickets issued
//! against a discarded node set are ignored.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::node::SimulatedNode;
use crate::shards::{allocate, ErasureConfig};
use crate::simulation::challenge::challenge_for_tick;
use crate::simulation::config::{ConfigError, RedundancyConfig};
use crate::simulation::events::{EventLog, SimEvent};
use crate::simulation::failure::apply_failures;
use crate::simulation::recovery::{self, RecoveryStatus};
use crate::simulation::repair::{finish_repair, start_repair, RepairTicket};
use crate::simulation::snapshot::SimulationSnapshot;

/// Whether the tick timer should be running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Stopped,
    Running,
}

/// Counters shown next to the simulation, zeroed on reset
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    /// Challenges recorded while anchoring was enabled
    pub anchored_events: u64,
    pub challenges: u64,
    pub failures: u64,
    pub repairs_started: u64,
    pub repairs_completed: u64,
}

/// What happened during one tick
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Tick number that was processed
    pub tick: u64,
    pub failed: Vec<usize>,
    pub repair: Option<RepairTicket>,
    pub challenged: bool,
}

/// Erasure-coded redundancy simulation
pub struct RedundancySimulator {
    config: RedundancyConfig,
    nodes: Vec<SimulatedNode>,
    tick: u64,
    stats: SimulationStats,
    run_state: RunState,
    generation: u64,
    events: EventLog,
    rng: ChaCha8Rng,
}

impl RedundancySimulator {
    /// Create a simulator with a random seed
    pub fn new(config: RedundancyConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::random())
    }

    /// Create a simulator whose random draws are reproducible
    pub fn with_seed(config: RedundancyConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let nodes = allocate(config.total_nodes, config.layout);
        info!(
            "Allocated {} shards (k={}, m={}) across {} nodes",
            config.layout.total_shards(),
            config.layout.data_shards,
            config.layout.parity_shards,
            config.total_nodes
        );

        Ok(Self {
            config,
            nodes,
            tick: 0,
            stats: SimulationStats::default(),
            run_state: RunState::Stopped,
            generation: 0,
            events: EventLog::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &RedundancyConfig {
        &self.config
    }

    pub fn layout(&self) -> &ErasureConfig {
        &self.config.layout
    }

    pub fn nodes(&self) -> &[SimulatedNode] {
        &self.nodes
    }

    /// Mutable access for building fixed scenarios
    pub fn nodes_mut(&mut self) -> &mut [SimulatedNode] {
        &mut self.nodes
    }

    /// Number of ticks processed since the last reset
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Incremented on every reset and topology change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Message currently on display
    pub fn last_message(&self) -> Option<String> {
        self.events.last().map(|e| e.to_string())
    }

    pub fn start(&mut self) {
        if self.run_state == RunState::Stopped {
            info!("Simulation started at tick {}", self.tick);
            self.run_state = RunState::Running;
        }
    }

    /// Stop ticking without touching any other state
    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            info!("Simulation paused at tick {}", self.tick);
            self.run_state = RunState::Stopped;
        }
    }

    /// Stop, reallocate every node and zero the counters
    pub fn reset(&mut self) {
        self.run_state = RunState::Stopped;
        self.reinitialize();
        self.events.push(0, SimEvent::Reset);
        info!("Simulation reset (generation {})", self.generation);
    }

    /// Swap in a new configuration.
    ///
    /// Changing the layout or node count reallocates the node set and
    /// zeroes the tick counter and stats; the run state is kept. Other
    /// parameters take effect on the next tick.
    pub fn reconfigure(&mut self, config: RedundancyConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let topology_changed = self.config.changes_topology(&config);
        self.config = config;

        if topology_changed {
            self.reinitialize();
            info!(
                "Reconfigured to k={}, m={}, {} nodes (generation {})",
                self.config.layout.data_shards,
                self.config.layout.parity_shards,
                self.config.total_nodes,
                self.generation
            );
        } else {
            debug!("Updated simulation parameters");
        }

        Ok(())
    }

    fn reinitialize(&mut self) {
        self.nodes = allocate(self.config.total_nodes, self.config.layout);
        self.tick = 0;
        self.stats = SimulationStats::default();
        self.events.clear();
        self.generation += 1;
    }

    /// Process one tick: failures, then repair, then the challenge clock.
    ///
    /// The returned ticket, if any, must be passed to
    /// [`complete_repair`](Self::complete_repair) after the repair delay.
    pub fn tick(&mut self) -> TickOutcome {
        let tick = self.tick;
        let mut outcome = TickOutcome {
            tick,
            ..Default::default()
        };

        // Failure process
        let probability = self.config.failure_probability();
        outcome.failed = apply_failures(&mut self.nodes, probability, &mut self.rng);
        self.stats.failures += outcome.failed.len() as u64;
        if let Some(&node_id) = outcome.failed.last() {
            self.events.push(tick, SimEvent::NodeFailed { node_id });
        }
        if !outcome.failed.is_empty() {
            warn!("Tick {}: nodes {:?} failed", tick, outcome.failed);
        }

        // Repair scheduler
        if let Some(node_id) = start_repair(
            &mut self.nodes,
            &self.config.layout,
            self.config.repair_threshold_percent,
            &mut self.rng,
        ) {
            info!("Tick {}: initiating self-repair on node {}", tick, node_id);
            self.stats.repairs_started += 1;
            self.events.push(tick, SimEvent::RepairStarted { node_id });
            outcome.repair = Some(RepairTicket {
                node_id,
                generation: self.generation,
            });
        }

        // Integrity challenge clock
        if let Some(challenge) = challenge_for_tick(tick, &self.config) {
            self.stats.challenges += 1;
            if challenge.anchored {
                self.stats.anchored_events += 1;
            }
            debug!("Tick {}: integrity challenge ({})", tick, challenge.mode.label());
            self.events.push(
                tick,
                SimEvent::Challenge {
                    mode: challenge.mode,
                    anchored: challenge.anchored,
                },
            );
            outcome.challenged = true;
        }

        self.tick += 1;
        outcome
    }

    /// Finish a repair started by [`tick`](Self::tick).
    ///
    /// Tickets from an earlier generation are ignored. Returns true if a
    /// node was brought back online.
    pub fn complete_repair(&mut self, ticket: RepairTicket) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Ignoring stale repair of node {} (generation {}, current {})",
                ticket.node_id, ticket.generation, self.generation
            );
            return false;
        }

        if !finish_repair(&mut self.nodes, ticket.node_id) {
            return false;
        }

        info!("Redundancy restored on node {}", ticket.node_id);
        self.stats.repairs_completed += 1;
        // Tagged with the last tick processed, not the one about to run
        self.events.push(
            self.tick.saturating_sub(1),
            SimEvent::RepairCompleted {
                node_id: ticket.node_id,
            },
        );
        true
    }

    pub fn is_recoverable(&self) -> bool {
        recovery::is_recoverable(&self.nodes, &self.config.layout)
    }

    pub fn recovery_status(&self) -> RecoveryStatus {
        RecoveryStatus::evaluate(&self.nodes, &self.config.layout)
    }

    /// Everything the rendering layer needs, as one serializable value
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick,
            run_state: self.run_state,
            generation: self.generation,
            config: self.config.clone(),
            nodes: self.nodes.clone(),
            recovery: self.recovery_status(),
            stats: self.stats.clone(),
            last_message: self.last_message(),
        }
    }
}
