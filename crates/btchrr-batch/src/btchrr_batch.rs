//! btchrr batch - turn one single-row statement and many items into
//! multi-row statements
//!
//! The pipeline is detection, partitioning, rewriting and execution:
//!
//! ```
//! use btchrr_batch::{Batcher, BatchOptions};
//! use btchrr_core::Value;
//!
//! let batcher = Batcher::new(BatchOptions::new().with_batch_size(2)).unwrap();
//! let items = vec![Value::from(1), Value::from(2), Value::from(3)];
//! let batches = batcher.build_batches("INSERT INTO t (id) VALUES (?)", &items).unwrap();
//!
//! assert_eq!(batches.len(), 2);
//! assert_eq!(batches[0].statement.as_str(), "INSERT INTO t (id) VALUES (?), (?);");
//! assert_eq!(batches[1].statement.as_str(), "INSERT INTO t (id) VALUES (?);");
//! ```

mod detector;
mod options;
mod partition;
mod plan;
pub mod rewrite;
mod run;

pub use detector::{PLACEHOLDER_SYMBOLS, PlaceholderDialect, detect_dialect};
pub use options::{BatchOptions, GroupSizing};
pub use partition::partition;
pub use plan::{Batch, Batcher};
pub use rewrite::{BatchedStatement, RewriteStrategy, ValuesTemplate};
pub use run::{AggregatedResult, BatchInserter, InsertIdRule};
