//! Random node failures
//!
//! Every healthy node independently fails with the same per-tick
//! probability. Nodes already failed or under repair are left alone.

use rand::Rng;
use tracing::debug;

use crate::node::{NodeTransition, SimulatedNode};

/// Run one round of failure draws.
///
/// Returns the ids of the nodes that failed, in evaluation order.
pub fn apply_failures<R: Rng + ?Sized>(
    nodes: &mut [SimulatedNode],
    probability: f64,
    rng: &mut R,
) -> Vec<usize> {
    let probability = probability.clamp(0.0, 1.0);
    let mut failed = Vec::new();

    for node in nodes.iter_mut().filter(|n| n.is_healthy()) {
        if rng.gen_bool(probability) && node.apply_transition(NodeTransition::Fail) {
            debug!("Node {} failed", node.id);
            failed.push(node.id);
        }
    }

    failed
}
