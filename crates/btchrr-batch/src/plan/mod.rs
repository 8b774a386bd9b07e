//! Batch planning: detection, partitioning and per-group rewriting

mod batcher;

pub use batcher::{Batch, Batcher};
