//! Node Status State Machine
//!
//! A simulated storage node is always in exactly one status. Status
//! changes are driven by simulated failures and the self-repair loop.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Possible statuses for a simulated node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Online, its shards count toward recoverability
    Healthy,
    /// Offline, its shards are unreachable
    Failed,
    /// Being rebuilt, its shards stay unreachable until repair completes
    Repairing,
}

impl NodeStatus {
    /// Whether the node's shards are reachable
    pub fn is_available(&self) -> bool {
        match self {
            NodeStatus::Healthy => true,
            NodeStatus::Failed | NodeStatus::Repairing => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Healthy => "healthy",
            NodeStatus::Failed => "failed",
            NodeStatus::Repairing => "repairing",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status transitions triggered by simulation events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTransition {
    /// Failure process hit the node
    Fail,
    /// Repair scheduler picked the node
    BeginRepair,
    /// Repair delay elapsed
    CompleteRepair,
}

/// Compute the next status for a transition.
///
/// Transitions that do not apply to the current status leave it unchanged.
pub fn next_status(current: NodeStatus, transition: NodeTransition) -> NodeStatus {
    use NodeStatus::*;
    use NodeTransition::*;

    match (current, transition) {
        (Healthy, Fail) => Failed,
        (Healthy, BeginRepair | CompleteRepair) => Healthy,

        (Failed, BeginRepair) => Repairing,
        (Failed, Fail | CompleteRepair) => Failed,

        (Repairing, CompleteRepair) => Healthy,
        (Repairing, Fail | BeginRepair) => Repairing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_and_repair_cycle() {
        let status = NodeStatus::Healthy;
        let status = next_status(status, NodeTransition::Fail);
        assert_eq!(status, NodeStatus::Failed);

        let status = next_status(status, NodeTransition::BeginRepair);
        assert_eq!(status, NodeStatus::Repairing);

        let status = next_status(status, NodeTransition::CompleteRepair);
        assert_eq!(status, NodeStatus::Healthy);
    }

    #[test]
    fn test_inapplicable_transitions_are_ignored() {
        assert_eq!(
            next_status(NodeStatus::Healthy, NodeTransition::CompleteRepair),
            NodeStatus::Healthy
        );
        // A node under repair cannot fail again until it is back online
        assert_eq!(
            next_status(NodeStatus::Repairing, NodeTransition::Fail),
            NodeStatus::Repairing
        );
        assert_eq!(
            next_status(NodeStatus::Failed, NodeTransition::CompleteRepair),
            NodeStatus::Failed
        );
    }

    #[test]
    fn test_only_healthy_is_available() {
        assert!(NodeStatus::Healthy.is_available());
        assert!(!NodeStatus::Failed.is_available());
        assert!(!NodeStatus::Repairing.is_available());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&NodeStatus::Repairing).unwrap();
        assert_eq!(json, "\"repairing\"");
    }
}
