//! Erasure coding layout
//!
//! A file is split into `k` data shards plus `m` parity shards. Any `k`
//! of the `k + m` shards are enough to rebuild the original.

use serde::{Deserialize, Serialize};

/// Erasure coding configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureConfig {
    /// Number of data shards (k)
    pub data_shards: usize,
    /// Number of parity shards (m)
    pub parity_shards: usize,
}

impl Default for ErasureConfig {
    fn default() -> Self {
        // 6 data + 4 parity = 10 total shards
        Self {
            data_shards: 6,
            parity_shards: 4,
        }
    }
}

impl ErasureConfig {
    pub fn new(data_shards: usize, parity_shards: usize) -> Self {
        Self {
            data_shards,
            parity_shards,
        }
    }

    /// Total number of shards (k + m)
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Number of shards that can be lost while staying recoverable
    pub fn fault_tolerance(&self) -> usize {
        self.parity_shards
    }

    /// Bytes stored per byte of payload, (k + m) / k
    pub fn storage_overhead(&self) -> f64 {
        self.total_shards() as f64 / self.data_shards as f64
    }

    /// Share of stored bytes that is payload, k / (k + m)
    pub fn storage_efficiency_percent(&self) -> f64 {
        self.data_shards as f64 / self.total_shards() as f64 * 100.0
    }

    /// Whether a set of `available` distinct shards is enough to rebuild
    pub fn can_reconstruct(&self, available: usize) -> bool {
        available >= self.data_shards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = ErasureConfig::default();
        assert_eq!(config.total_shards(), 10);
        assert_eq!(config.fault_tolerance(), 4);
    }

    #[test]
    fn test_overhead_and_efficiency() {
        let config = ErasureConfig::new(4, 2);
        assert!((config.storage_overhead() - 1.5).abs() < f64::EPSILON);
        assert!((config.storage_efficiency_percent() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_reconstruct_threshold() {
        let config = ErasureConfig::new(3, 2);
        assert!(config.can_reconstruct(3));
        assert!(config.can_reconstruct(5));
        assert!(!config.can_reconstruct(2));
    }
}
