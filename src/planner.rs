//! Storage Planner
//!
//! Capacity and fault-tolerance figures for placing one erasure-coded
//! file on a set of nodes with the round-robin allocator.

use serde::Serialize;

use crate::shards::{allocate, shard_load, ErasureConfig};

/// Storage requirements for a single file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoragePlan {
    pub file_size_bytes: u64,
    /// Size of one shard, the file split into k pieces (rounded up)
    pub shard_size_bytes: u64,
    /// Bytes stored across the network, all k + m shards
    pub total_stored_bytes: u64,
    pub overhead_ratio: f64,
    pub efficiency_percent: f64,
    /// Shards that can be lost while staying recoverable
    pub fault_tolerance_shards: usize,
    /// Most shards any one node holds
    pub max_shards_per_node: usize,
    /// Bytes held by the most loaded node
    pub max_bytes_per_node: u64,
    /// Nodes holding at least one shard
    pub nodes_used: usize,
    /// Whole nodes that can be lost in the worst case
    pub node_loss_tolerance: usize,
}

impl StoragePlan {
    /// Plan placement of `file_size_bytes` over `total_nodes` nodes.
    ///
    /// Precondition: `total_nodes >= 1` and `layout.data_shards >= 1`.
    pub fn compute(file_size_bytes: u64, layout: ErasureConfig, total_nodes: usize) -> Self {
        let k = layout.data_shards as u64;
        let shard_size_bytes = file_size_bytes.div_ceil(k);

        let loads = shard_load(&allocate(total_nodes, layout));
        let max_shards_per_node = loads.iter().copied().max().unwrap_or(0);

        Self {
            file_size_bytes,
            shard_size_bytes,
            total_stored_bytes: shard_size_bytes * layout.total_shards() as u64,
            overhead_ratio: layout.storage_overhead(),
            efficiency_percent: layout.storage_efficiency_percent(),
            fault_tolerance_shards: layout.fault_tolerance(),
            max_shards_per_node,
            max_bytes_per_node: shard_size_bytes * max_shards_per_node as u64,
            nodes_used: loads.iter().filter(|&&l| l > 0).count(),
            node_loss_tolerance: worst_case_node_losses(loads, layout.fault_tolerance()),
        }
    }
}

/// Largest number of nodes that can fail, heaviest first, while no more
/// than `tolerance` shards are lost
fn worst_case_node_losses(mut loads: Vec<usize>, tolerance: usize) -> usize {
    loads.sort_unstable_by(|a, b| b.cmp(a));

    let mut lost = 0;
    let mut nodes = 0;
    for load in loads {
        lost += load;
        if lost > tolerance {
            break;
        }
        nodes += 1;
    }
    nodes
}
