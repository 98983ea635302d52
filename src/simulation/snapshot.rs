//! Read-only view of the simulation for the rendering layer

use serde::Serialize;

use crate::node::SimulatedNode;
use crate::simulation::config::RedundancyConfig;
use crate::simulation::engine::{RunState, SimulationStats};
use crate::simulation::recovery::RecoveryStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    pub tick: u64,
    pub run_state: RunState,
    pub generation: u64,
    pub config: RedundancyConfig,
    pub nodes: Vec<SimulatedNode>,
    pub recovery: RecoveryStatus,
    pub stats: SimulationStats,
    pub last_message: Option<String>,
}

impl SimulationSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// One-line summary for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "tick {:>4} | healthy {:>3} failed {:>3} repairing {:>3} | shards {}/{} | {} | anchored {}",
            self.tick,
            self.recovery.healthy_nodes,
            self.recovery.failed_nodes,
            self.recovery.repairing_nodes,
            self.recovery.active_shards.len(),
            self.config.layout.total_shards(),
            if self.recovery.is_recoverable {
                "recoverable"
            } else {
                "DATA LOSS"
            },
            self.stats.anchored_events,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::{RedundancyConfig, RedundancySimulator};

    #[test]
    fn test_snapshot_json_fields() {
        let sim = RedundancySimulator::with_seed(RedundancyConfig::default(), 1).unwrap();
        let json = sim.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tick"], 0);
        assert_eq!(value["run_state"], "stopped");
        assert_eq!(value["recovery"]["is_recoverable"], true);
        assert_eq!(value["nodes"][0]["status"], "healthy");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn test_summary_mentions_state() {
        let sim = RedundancySimulator::with_seed(RedundancyConfig::default(), 1).unwrap();
        let summary = sim.snapshot().summary();
        assert!(summary.contains("recoverable"));
        assert!(summary.contains("shards 10/10"));
    }
}
