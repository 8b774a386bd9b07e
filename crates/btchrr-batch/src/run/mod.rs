//! Batch execution against a `StatementExecutor`

mod inserter;
mod result;

pub use inserter::BatchInserter;
pub use result::{AggregatedResult, InsertIdRule};
