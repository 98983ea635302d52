//! Integrity challenge clock
//!
//! Challenges are display-only. They never change node status or
//! recoverability; with anchoring on they bump the anchored counter.

use crate::simulation::config::RedundancyConfig;
use crate::simulation::events::VerificationMode;

/// A challenge issued on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub mode: VerificationMode,
    pub anchored: bool,
}

/// Whether `tick` is a challenge tick. Tick 0 always is.
pub fn is_challenge_tick(tick: u64, frequency_ticks: u64) -> bool {
    tick % frequency_ticks == 0
}

/// Issue a challenge if `tick` is due for one
pub fn challenge_for_tick(tick: u64, config: &RedundancyConfig) -> Option<Challenge> {
    if !is_challenge_tick(tick, config.challenge_frequency_ticks) {
        return None;
    }

    Some(Challenge {
        mode: VerificationMode::from_integrity_checks(config.enable_integrity_checks),
        anchored: config.enable_anchoring,
    })
}
