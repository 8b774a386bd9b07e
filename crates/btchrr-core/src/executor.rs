//! The executor contract the batching engine is driven through

use async_trait::async_trait;

use crate::{ExecutionContext, ExecutionOutcome, Result, Value};

/// A database layer that can validate and execute statements.
///
/// Implementations own connection handling, locking and any transaction
/// discipline. The batching engine only calls these two methods, in order,
/// one statement at a time.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Driver name, used in log fields (e.g. "sqlite")
    fn driver_name(&self) -> &str;

    /// Validate a single-row statement without executing it.
    ///
    /// Fails with `BtchrrError::StatementInvalid` when the database rejects it.
    async fn check_statement(&self, sql: &str) -> Result<()>;

    /// Execute one batched statement with its flattened bind values.
    ///
    /// Failures are reported as `BtchrrError::Execution`; the engine
    /// surfaces them to the caller unchanged.
    async fn execute(
        &self,
        ctx: &ExecutionContext,
        sql: &str,
        params: &[Value],
    ) -> Result<ExecutionOutcome>;
}
