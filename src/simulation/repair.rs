//! Self-repair scheduling
//!
//! When too few shard slots are reachable, one failed node is picked at
//! random and moved to `Repairing`. The repair finishes later through a
//! [`RepairTicket`], which is only honoured for the generation of the
//! node set it was issued against.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::node::{NodeTransition, SimulatedNode};
use crate::shards::ErasureConfig;
use crate::simulation::recovery::health_percent;

/// Handle for a repair that completes after the repair delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RepairTicket {
    pub node_id: usize,
    /// Simulation generation the repair was started in
    pub generation: u64,
}

/// Whether the repair condition holds for the current node set
pub fn needs_repair(nodes: &[SimulatedNode], layout: &ErasureConfig, threshold_percent: f64) -> bool {
    health_percent(nodes, layout) < threshold_percent
        && nodes.iter().any(|n| n.is_healthy())
        && nodes.iter().any(|n| n.is_failed())
}

/// Start at most one repair. Returns the id of the node moved to `Repairing`.
pub fn start_repair<R: Rng + ?Sized>(
    nodes: &mut [SimulatedNode],
    layout: &ErasureConfig,
    threshold_percent: f64,
    rng: &mut R,
) -> Option<usize> {
    if !needs_repair(nodes, layout, threshold_percent) {
        return None;
    }

    let failed: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_failed())
        .map(|(i, _)| i)
        .collect();
    let index = *failed.choose(rng)?;

    let node = &mut nodes[index];
    node.apply_transition(NodeTransition::BeginRepair);
    Some(node.id)
}

/// Bring a repairing node back online. Returns false if it was not repairing.
pub fn finish_repair(nodes: &mut [SimulatedNode], node_id: usize) -> bool {
    match nodes.iter_mut().find(|n| n.id == node_id) {
        Some(node) if node.is_repairing() => node.apply_transition(NodeTransition::CompleteRepair),
        _ => false,
    }
}
