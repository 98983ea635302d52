//! Deterministic virtual-time driver.
//!
//! Plays the role of the UI timers without wall-clock waits: the main
//! tick timer and the one-shot repair timers are entries in a single
//! ordered queue. Given the same seed, a run produces identical results.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, trace};

use crate::simulation::config::{ConfigError, RedundancyConfig, SimulationTiming};
use crate::simulation::engine::{RedundancySimulator, TickOutcome};
use crate::simulation::event_queue::{EventKey, ScheduledEvent};

/// Counters for the runner itself
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunnerStats {
    pub events_processed: u64,
    pub ticks_fired: u64,
    pub repairs_scheduled: u64,
    /// Repair completions dropped because the node set was reset
    pub stale_repairs: u64,
}

/// Drives a [`RedundancySimulator`] on a virtual clock
pub struct SimulationRunner {
    sim: RedundancySimulator,
    timing: SimulationTiming,
    event_queue: BTreeMap<EventKey, ScheduledEvent>,
    sequence: u64,
    now: Duration,
    /// Pending main tick, removed on pause/reset
    tick_timer: Option<EventKey>,
    stats: RunnerStats,
}

impl SimulationRunner {
    pub fn new(sim: RedundancySimulator, timing: SimulationTiming) -> Result<Self, ConfigError> {
        timing.validate()?;

        Ok(Self {
            sim,
            timing,
            event_queue: BTreeMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            tick_timer: None,
            stats: RunnerStats::default(),
        })
    }

    /// Build a seeded simulator with default timing
    pub fn with_seed(config: RedundancyConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(
            RedundancySimulator::with_seed(config, seed)?,
            SimulationTiming::default(),
        )
    }

    pub fn simulator(&self) -> &RedundancySimulator {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut RedundancySimulator {
        &mut self.sim
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn stats(&self) -> &RunnerStats {
        &self.stats
    }

    /// Number of events waiting in the queue
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Start the tick timer. The first tick fires one period from now.
    pub fn start(&mut self) {
        if self.sim.is_running() {
            return;
        }
        self.sim.start();
        self.schedule_tick();
    }

    /// Stop the tick timer. In-flight repairs still complete.
    pub fn pause(&mut self) {
        self.sim.pause();
        self.cancel_tick();
    }

    /// Stop the tick timer and reset the simulator.
    ///
    /// Repair completions already queued stay in the queue but belong to
    /// the old generation, so they are discarded when they fire.
    pub fn reset(&mut self) {
        self.cancel_tick();
        self.sim.reset();
    }

    pub fn reconfigure(&mut self, config: RedundancyConfig) -> Result<(), ConfigError> {
        self.sim.reconfigure(config)
    }

    /// Process every event due up to and including `now + duration`.
    pub fn run_for(&mut self, duration: Duration) {
        let deadline = self.now + duration;
        self.run_until(deadline);
    }

    /// Process every event due up to and including `deadline`.
    pub fn run_until(&mut self, deadline: Duration) {
        while let Some(event) = self.step(deadline) {
            trace!(?event, now = ?self.now, "processed event");
        }
        self.now = self.now.max(deadline);
    }

    /// Run until `count` more ticks have fired. Starts the timer if needed.
    ///
    /// Returns the outcome of each tick.
    pub fn run_ticks(&mut self, count: u64) -> Vec<TickOutcome> {
        self.start();
        let mut outcomes = Vec::new();
        while (outcomes.len() as u64) < count {
            let Some((key, event)) = self.event_queue.pop_first() else {
                break;
            };
            if let Some(outcome) = self.process(key, event) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Pop and process the next event if it is due by `deadline`.
    fn step(&mut self, deadline: Duration) -> Option<ScheduledEvent> {
        let (&key, _) = self.event_queue.first_key_value()?;
        if key.time > deadline {
            return None;
        }
        let (key, event) = self.event_queue.pop_first()?;
        self.process(key, event);
        Some(event)
    }

    fn process(&mut self, key: EventKey, event: ScheduledEvent) -> Option<TickOutcome> {
        self.now = key.time;
        self.stats.events_processed += 1;

        match event {
            ScheduledEvent::Tick => {
                self.tick_timer = None;
                self.stats.ticks_fired += 1;

                let outcome = self.sim.tick();
                if let Some(ticket) = outcome.repair {
                    let at = self.now + self.timing.repair_delay;
                    self.schedule(at, ScheduledEvent::RepairComplete(ticket));
                    self.stats.repairs_scheduled += 1;
                }

                if self.sim.is_running() {
                    self.schedule_tick();
                }
                Some(outcome)
            }
            ScheduledEvent::RepairComplete(ticket) => {
                if ticket.generation != self.sim.generation() {
                    self.stats.stale_repairs += 1;
                }
                self.sim.complete_repair(ticket);
                None
            }
        }
    }

    fn schedule(&mut self, time: Duration, event: ScheduledEvent) -> EventKey {
        self.sequence += 1;
        let key = EventKey {
            time,
            sequence: self.sequence,
        };
        self.event_queue.insert(key, event);
        key
    }

    fn schedule_tick(&mut self) {
        let at = self.now + self.timing.tick_period;
        let key = self.schedule(at, ScheduledEvent::Tick);
        self.tick_timer = Some(key);
    }

    fn cancel_tick(&mut self) {
        if let Some(key) = self.tick_timer.take() {
            self.event_queue.remove(&key);
            debug!("Cancelled tick timer due at {:?}", key.time);
        }
    }
}
