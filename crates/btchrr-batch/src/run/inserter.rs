//! Sequential batch execution

use std::sync::Arc;
use std::time::{Duration, Instant};

use btchrr_core::{BindItem, ExecutionContext, Result, StatementExecutor};

use super::result::AggregatedResult;
use crate::options::BatchOptions;
use crate::plan::Batcher;

/// Executes a single-row statement for many items, a batch at a time
#[derive(Clone)]
pub struct BatchInserter {
    batcher: Batcher,
    executor: Arc<dyn StatementExecutor>,
}

impl std::fmt::Debug for BatchInserter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchInserter")
            .field("batcher", &self.batcher)
            .field("driver", &self.executor.driver_name())
            .finish()
    }
}

impl BatchInserter {
    /// Create an inserter, rejecting invalid options
    pub fn new(options: BatchOptions, executor: Arc<dyn StatementExecutor>) -> Result<Self> {
        Ok(Self {
            batcher: Batcher::new(options)?,
            executor,
        })
    }

    pub fn batcher(&self) -> &Batcher {
        &self.batcher
    }

    pub fn executor(&self) -> &Arc<dyn StatementExecutor> {
        &self.executor
    }

    /// Check, plan and execute `sql` for every item.
    ///
    /// Batches run strictly in order, each awaited before the next starts.
    /// The first failure aborts the run and is returned unchanged; batches
    /// already executed stay applied.
    pub async fn execute<T>(
        &self,
        ctx: &ExecutionContext,
        sql: &str,
        items: &[T],
    ) -> Result<AggregatedResult>
    where
        T: BindItem + Clone,
    {
        let start = Instant::now();
        let options = self.batcher.options();
        let ctx = match (options.statement_timeout_ms, ctx.get_deadline()) {
            (ms, None) if ms > 0 => ctx.child(Some(Duration::from_millis(ms))),
            _ => ctx.clone(),
        };

        if options.check_statement {
            ctx.run(self.executor.check_statement(sql)).await?;
        }

        let batches = self.batcher.build_batches(sql, items)?;
        let mut result = AggregatedResult::new();

        for batch in &batches {
            let params = batch.params();
            tracing::debug!(
                driver = self.executor.driver_name(),
                index = batch.index,
                rows = batch.len(),
                params = params.len(),
                sql_preview = %batch.statement.as_str().chars().take(100).collect::<String>(),
                "executing batch"
            );

            let outcome = ctx
                .run(self.executor.execute(&ctx, batch.statement.as_str(), &params))
                .await?;
            result.absorb(&outcome);
        }

        result.elapsed = start.elapsed();
        tracing::info!(
            driver = self.executor.driver_name(),
            batches = result.batches,
            affected_rows = result.affected_rows,
            last_insert_id = ?result.last_insert_id,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "batched execution completed"
        );
        Ok(result)
    }
}
