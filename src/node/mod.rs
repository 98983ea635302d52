//! Simulated storage nodes
//!
//! Each node holds a fixed list of shard indices for its whole lifetime.
//! Only its status changes while the simulation runs.

mod state_machine;

pub use state_machine::{next_status, NodeStatus, NodeTransition};

use serde::Serialize;

/// A storage node taking part in the redundancy simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedNode {
    /// Stable identity for the lifetime of the simulation
    pub id: usize,
    status: NodeStatus,
    /// Shard indices physically held by this node
    pub shards: Vec<usize>,
    failure_count: u32,
    repair_count: u32,
}

impl SimulatedNode {
    /// Create a healthy node holding no shards
    pub fn new(id: usize) -> Self {
        Self {
            id,
            status: NodeStatus::Healthy,
            shards: Vec::new(),
            failure_count: 0,
            repair_count: 0,
        }
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn is_healthy(&self) -> bool {
        self.status == NodeStatus::Healthy
    }

    pub fn is_failed(&self) -> bool {
        self.status == NodeStatus::Failed
    }

    pub fn is_repairing(&self) -> bool {
        self.status == NodeStatus::Repairing
    }

    /// Number of times this node has failed
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Number of completed repairs on this node
    pub fn repair_count(&self) -> u32 {
        self.repair_count
    }

    /// Apply a transition. Returns true if the status changed.
    pub fn apply_transition(&mut self, transition: NodeTransition) -> bool {
        let old_status = self.status;
        let new_status = next_status(old_status, transition);
        if old_status == new_status {
            return false;
        }

        match transition {
            NodeTransition::Fail => self.failure_count += 1,
            NodeTransition::CompleteRepair => self.repair_count += 1,
            NodeTransition::BeginRepair => {}
        }

        self.status = new_status;
        true
    }

    /// Force a status, bypassing the transition table.
    ///
    /// Used to build fixed scenarios; the simulation itself only moves
    /// nodes through [`apply_transition`](Self::apply_transition).
    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_healthy_and_empty() {
        let node = SimulatedNode::new(7);
        assert_eq!(node.id, 7);
        assert!(node.is_healthy());
        assert!(node.shards.is_empty());
    }

    #[test]
    fn test_counters_track_transitions() {
        let mut node = SimulatedNode::new(0);

        assert!(node.apply_transition(NodeTransition::Fail));
        assert!(!node.apply_transition(NodeTransition::Fail));
        assert_eq!(node.failure_count(), 1);

        assert!(node.apply_transition(NodeTransition::BeginRepair));
        assert!(node.is_repairing());
        assert!(node.apply_transition(NodeTransition::CompleteRepair));
        assert!(node.is_healthy());
        assert_eq!(node.repair_count(), 1);
    }
}
