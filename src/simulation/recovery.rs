//! Recoverability evaluation
//!
//! Pure queries over the node set. Only `Healthy` nodes contribute
//! shards; a node under repair is as unreachable as a failed one.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::node::SimulatedNode;
use crate::shards::ErasureConfig;

/// Distinct shard indices held by healthy nodes
pub fn active_shard_set(nodes: &[SimulatedNode]) -> BTreeSet<usize> {
    nodes
        .iter()
        .filter(|n| n.status().is_available())
        .flat_map(|n| n.shards.iter().copied())
        .collect()
}

/// Shard slots held by healthy nodes.
///
/// Sums list lengths without deduplicating, which is what the repair
/// threshold is measured against.
pub fn active_shard_slots(nodes: &[SimulatedNode]) -> usize {
    nodes
        .iter()
        .filter(|n| n.status().is_available())
        .map(|n| n.shards.len())
        .sum()
}

/// Whether the file can be rebuilt from the reachable shards
pub fn is_recoverable(nodes: &[SimulatedNode], layout: &ErasureConfig) -> bool {
    layout.can_reconstruct(active_shard_set(nodes).len())
}

/// Reachable distinct shards as a percentage of all shards
pub fn recovery_progress_percent(nodes: &[SimulatedNode], layout: &ErasureConfig) -> f64 {
    active_shard_set(nodes).len() as f64 / layout.total_shards() as f64 * 100.0
}

/// Reachable shard slots as a percentage of all shards
pub fn health_percent(nodes: &[SimulatedNode], layout: &ErasureConfig) -> f64 {
    active_shard_slots(nodes) as f64 / layout.total_shards() as f64 * 100.0
}

/// All derived values in one pass, for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryStatus {
    pub active_shards: Vec<usize>,
    pub active_shard_slots: usize,
    pub is_recoverable: bool,
    pub recovery_progress_percent: f64,
    pub health_percent: f64,
    pub healthy_nodes: usize,
    pub failed_nodes: usize,
    pub repairing_nodes: usize,
}

impl RecoveryStatus {
    pub fn evaluate(nodes: &[SimulatedNode], layout: &ErasureConfig) -> Self {
        let active = active_shard_set(nodes);
        let total = layout.total_shards() as f64;
        let slots = active_shard_slots(nodes);

        Self {
            is_recoverable: layout.can_reconstruct(active.len()),
            recovery_progress_percent: active.len() as f64 / total * 100.0,
            health_percent: slots as f64 / total * 100.0,
            active_shard_slots: slots,
            active_shards: active.into_iter().collect(),
            healthy_nodes: nodes.iter().filter(|n| n.is_healthy()).count(),
            failed_nodes: nodes.iter().filter(|n| n.is_failed()).count(),
            repairing_nodes: nodes.iter().filter(|n| n.is_repairing()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStatus;
    use crate::shards::allocate;

    fn fail(nodes: &mut [SimulatedNode], ids: &[usize]) {
        for &id in ids {
            nodes[id].set_status(NodeStatus::Failed);
        }
    }

    #[test]
    fn test_four_failures_within_tolerance() {
        let layout = ErasureConfig::new(6, 4);
        let mut nodes = allocate(12, layout);
        fail(&mut nodes, &[0, 1, 2, 3]);

        let active = active_shard_set(&nodes);
        assert_eq!(active, (4..10).collect());
        assert!(is_recoverable(&nodes, &layout));

        fail(&mut nodes, &[4]);
        assert_eq!(active_shard_set(&nodes).len(), 5);
        assert!(!is_recoverable(&nodes, &layout));
    }

    #[test]
    fn test_exact_threshold() {
        let layout = ErasureConfig::new(3, 2);
        let mut nodes = allocate(5, layout);

        // Exactly k distinct shards reachable
        fail(&mut nodes, &[3, 4]);
        assert!(is_recoverable(&nodes, &layout));

        // k - 1
        fail(&mut nodes, &[2]);
        assert!(!is_recoverable(&nodes, &layout));
    }

    #[test]
    fn test_repairing_nodes_do_not_count() {
        let layout = ErasureConfig::new(2, 1);
        let mut nodes = allocate(3, layout);
        nodes[0].set_status(NodeStatus::Repairing);
        nodes[1].set_status(NodeStatus::Failed);

        assert_eq!(active_shard_set(&nodes).len(), 1);
        assert!(!is_recoverable(&nodes, &layout));
    }

    #[test]
    fn test_evaluation_is_stable() {
        let layout = ErasureConfig::new(6, 4);
        let mut nodes = allocate(12, layout);
        fail(&mut nodes, &[1, 7]);

        let first = RecoveryStatus::evaluate(&nodes, &layout);
        let second = RecoveryStatus::evaluate(&nodes, &layout);
        assert_eq!(first, second);
        assert_eq!(first.failed_nodes, 2);
        assert_eq!(first.healthy_nodes, 10);
        assert!((first.recovery_progress_percent - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_and_health() {
        let layout = ErasureConfig::new(6, 4);
        let nodes = allocate(12, layout);
        assert!((recovery_progress_percent(&nodes, &layout) - 100.0).abs() < 1e-9);
        assert!((health_percent(&nodes, &layout) - 100.0).abs() < 1e-9);
        assert_eq!(active_shard_slots(&nodes), 10);
    }
}
