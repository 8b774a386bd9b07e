//! Batch builder implementation

use btchrr_core::{BindItem, Result, Value, flatten_bind_values};

use crate::detector::detect_dialect;
use crate::options::BatchOptions;
use crate::partition::partition;
use crate::rewrite::{BatchedStatement, ValuesTemplate};

/// One group of items and the statement that inserts them
#[derive(Debug, Clone)]
pub struct Batch<T> {
    /// Position of this batch in the run (0-based)
    pub index: usize,
    /// The rewritten multi-row statement
    pub statement: BatchedStatement,
    /// Items bound to the statement, in order
    pub items: Vec<T>,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: BindItem> Batch<T> {
    /// Bind values for the statement, items flattened in order
    pub fn params(&self) -> Vec<Value> {
        flatten_bind_values(&self.items)
    }
}

/// Turns a single-row statement and a list of items into batches
#[derive(Debug, Clone)]
pub struct Batcher {
    options: BatchOptions,
}

impl Batcher {
    /// Create a batcher, rejecting a zero batch size
    pub fn new(options: BatchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Create a batcher with default options and the given batch size
    pub fn with_batch_size(batch_size: usize) -> Result<Self> {
        Self::new(BatchOptions::new().with_batch_size(batch_size))
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn batch_size(&self) -> usize {
        self.options.batch_size
    }

    /// Build one batch per group of items.
    ///
    /// The dialect is detected once for the whole run, then items are
    /// partitioned and every group is rewritten. The first error from any
    /// stage is returned as is.
    pub fn build_batches<T: Clone>(&self, sql: &str, items: &[T]) -> Result<Vec<Batch<T>>> {
        let batch_size = self.options.batch_size;
        let dialect = detect_dialect(sql)?;
        let groups = partition(items, batch_size)?;
        let template = ValuesTemplate::parse(sql)?;
        let strategy = dialect.strategy();

        tracing::debug!(
            %dialect,
            items = items.len(),
            groups = groups.len(),
            batch_size,
            "planning batches"
        );

        groups
            .into_iter()
            .enumerate()
            .map(|(index, items)| {
                let rows = self.options.row_sizing.row_groups(items.len(), batch_size);
                if rows > items.len() {
                    tracing::warn!(
                        index,
                        rows,
                        items = items.len(),
                        "statement sized from batch size has more row-groups than items"
                    );
                }
                let statement = strategy.rewrite(&template, rows)?;
                Ok(Batch {
                    index,
                    statement,
                    items,
                })
            })
            .collect()
    }

    /// Rewritten statements only, in order
    pub fn build_statements<T: Clone>(
        &self,
        sql: &str,
        items: &[T],
    ) -> Result<Vec<BatchedStatement>> {
        Ok(self
            .build_batches(sql, items)?
            .into_iter()
            .map(|batch| batch.statement)
            .collect())
    }
}
