//! Simulation configuration
//!
//! Parameters come from user-adjustable inputs, so every field has a
//! default and a `with_*` setter. Use [`RedundancyConfig::validate`]
//! before handing a config to the simulator.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::shards::ErasureConfig;

/// Per-tick failure probability is `failure_rate_percent / 100 * FAILURE_RATE_SCALE`.
pub const FAILURE_RATE_SCALE: f64 = 0.1;

/// Period of the main tick timer
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(2000);

/// Delay between starting and finishing a node repair
pub const DEFAULT_REPAIR_DELAY: Duration = Duration::from_millis(1500);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("data shard count (k) must be at least 1")]
    NoDataShards,
    #[error("parity shard count (m) must be at least 1")]
    NoParityShards,
    #[error("node count must be at least 1")]
    NoNodes,
    #[error("challenge frequency must be at least 1 tick")]
    ZeroChallengeFrequency,
    #[error("tick period must be longer than zero")]
    ZeroTickPeriod,
    #[error("{field} must be within 0..=100 (got {value})")]
    PercentOutOfRange { field: &'static str, value: f64 },
}

/// Parameters of a redundancy simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedundancyConfig {
    /// Erasure layout (k data shards, m parity shards)
    pub layout: ErasureConfig,
    /// Number of simulated storage nodes
    pub total_nodes: usize,
    /// Configured failure rate, scaled by [`FAILURE_RATE_SCALE`] per tick
    pub failure_rate_percent: f64,
    /// Health percentage below which self-repair starts
    pub repair_threshold_percent: f64,
    /// A challenge fires every this many ticks
    pub challenge_frequency_ticks: u64,
    /// Verify challenges with TSS instead of a direct check
    pub enable_integrity_checks: bool,
    /// Record challenges to the external ledger
    pub enable_anchoring: bool,
}

impl Default for RedundancyConfig {
    fn default() -> Self {
        Self {
            layout: ErasureConfig::default(),
            total_nodes: 12,
            failure_rate_percent: 5.0,
            repair_threshold_percent: 80.0,
            challenge_frequency_ticks: 5,
            enable_integrity_checks: true,
            enable_anchoring: true,
        }
    }
}

impl RedundancyConfig {
    pub fn with_layout(mut self, data_shards: usize, parity_shards: usize) -> Self {
        self.layout = ErasureConfig::new(data_shards, parity_shards);
        self
    }

    pub fn with_total_nodes(mut self, total_nodes: usize) -> Self {
        self.total_nodes = total_nodes;
        self
    }

    pub fn with_failure_rate(mut self, percent: f64) -> Self {
        self.failure_rate_percent = percent;
        self
    }

    pub fn with_repair_threshold(mut self, percent: f64) -> Self {
        self.repair_threshold_percent = percent;
        self
    }

    pub fn with_challenge_frequency(mut self, ticks: u64) -> Self {
        self.challenge_frequency_ticks = ticks;
        self
    }

    pub fn with_integrity_checks(mut self, enabled: bool) -> Self {
        self.enable_integrity_checks = enabled;
        self
    }

    pub fn with_anchoring(mut self, enabled: bool) -> Self {
        self.enable_anchoring = enabled;
        self
    }

    /// Probability that a healthy node fails during one tick
    pub fn failure_probability(&self) -> f64 {
        (self.failure_rate_percent / 100.0 * FAILURE_RATE_SCALE).clamp(0.0, 1.0)
    }

    /// Whether moving to `other` requires reallocating the node set
    pub fn changes_topology(&self, other: &RedundancyConfig) -> bool {
        self.layout != other.layout || self.total_nodes != other.total_nodes
    }

    /// Check the preconditions the simulator relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.data_shards == 0 {
            return Err(ConfigError::NoDataShards);
        }
        if self.layout.parity_shards == 0 {
            return Err(ConfigError::NoParityShards);
        }
        if self.total_nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        if self.challenge_frequency_ticks == 0 {
            return Err(ConfigError::ZeroChallengeFrequency);
        }
        check_percent("failure_rate_percent", self.failure_rate_percent)?;
        check_percent("repair_threshold_percent", self.repair_threshold_percent)?;
        Ok(())
    }
}

fn check_percent(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::PercentOutOfRange { field, value })
    }
}

/// Timer settings for the drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTiming {
    pub tick_period: Duration,
    pub repair_delay: Duration,
}

impl SimulationTiming {
    /// A zero tick period would fire the tick timer forever at one instant
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        Ok(())
    }
}

impl Default for SimulationTiming {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            repair_delay: DEFAULT_REPAIR_DELAY,
        }
    }
}
