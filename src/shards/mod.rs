//! Shard layout module
//!
//! Describes the erasure-coded layout of a simulated file and places
//! its shards onto simulated storage nodes.

pub mod allocator;
pub mod erasure;

pub use allocator::{allocate, shard_load};
pub use erasure::ErasureConfig;
