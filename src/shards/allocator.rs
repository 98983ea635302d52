//! Round-robin shard placement
//!
//! Shard `s` goes to node `s mod total_nodes`. When there are fewer nodes
//! than shards the placement wraps and some nodes hold several shards;
//! when there are more, the trailing nodes hold none.

use crate::node::SimulatedNode;
use crate::shards::ErasureConfig;

/// Build `total_nodes` healthy nodes and place every shard of `layout`.
///
/// Precondition: `total_nodes >= 1` and `layout.data_shards >= 1`.
/// Callers are expected to validate the configuration first.
pub fn allocate(total_nodes: usize, layout: ErasureConfig) -> Vec<SimulatedNode> {
    let mut nodes: Vec<SimulatedNode> = (0..total_nodes).map(SimulatedNode::new).collect();

    for shard_index in 0..layout.total_shards() {
        nodes[shard_index % total_nodes].shards.push(shard_index);
    }

    nodes
}

/// Number of shards each node holds, by node index
pub fn shard_load(nodes: &[SimulatedNode]) -> Vec<usize> {
    nodes.iter().map(|n| n.shards.len()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_allocation_is_deterministic() {
        let layout = ErasureConfig::new(6, 4);
        let first = allocate(12, layout);
        let second = allocate(12, layout);
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_shard_is_placed_once() {
        for (nodes, k, m) in [(12, 6, 4), (3, 6, 4), (10, 6, 4), (1, 2, 1)] {
            let layout = ErasureConfig::new(k, m);
            let allocated = allocate(nodes, layout);

            let placed: Vec<usize> = allocated.iter().flat_map(|n| n.shards.clone()).collect();
            let distinct: BTreeSet<usize> = placed.iter().copied().collect();
            let expected: BTreeSet<usize> = (0..k + m).collect();

            assert_eq!(placed.len(), k + m);
            assert_eq!(distinct, expected);
        }
    }

    #[test]
    fn test_extra_nodes_hold_nothing() {
        let nodes = allocate(12, ErasureConfig::new(6, 4));

        for (i, node) in nodes.iter().enumerate().take(10) {
            assert_eq!(node.shards, vec![i]);
        }
        assert!(nodes[10].shards.is_empty());
        assert!(nodes[11].shards.is_empty());
        assert!(nodes.iter().all(|n| n.is_healthy()));
    }

    #[test]
    fn test_fewer_nodes_wrap_around() {
        let nodes = allocate(4, ErasureConfig::new(6, 4));

        assert_eq!(nodes[0].shards, vec![0, 4, 8]);
        assert_eq!(nodes[1].shards, vec![1, 5, 9]);
        assert_eq!(nodes[2].shards, vec![2, 6]);
        assert_eq!(nodes[3].shards, vec![3, 7]);
        assert_eq!(shard_load(&nodes), vec![3, 3, 2, 2]);
    }
}
