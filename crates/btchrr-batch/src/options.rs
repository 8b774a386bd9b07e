//! Batching configuration

use btchrr_core::{BtchrrError, Result};
use serde::{Deserialize, Serialize};

/// Configuration options for building and running batches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Maximum number of items per batched statement
    pub batch_size: usize,
    /// How many row-groups each rewritten statement repeats
    pub row_sizing: GroupSizing,
    /// Whether to validate the single-row statement with the executor first
    pub check_statement: bool,
    /// Deadline for a whole run in milliseconds when the caller's context
    /// has none (0 = no deadline)
    pub statement_timeout_ms: u64,
}

impl BatchOptions {
    /// Create new batch options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of items per statement
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set how row-groups are counted
    pub fn with_row_sizing(mut self, row_sizing: GroupSizing) -> Self {
        self.row_sizing = row_sizing;
        self
    }

    /// Enable or disable the up-front statement check
    pub fn with_check_statement(mut self, check: bool) -> Self {
        self.check_statement = check;
        self
    }

    /// Set the run deadline in milliseconds
    pub fn with_statement_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.statement_timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BtchrrError::InvalidConfiguration(
                "batch size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            row_sizing: GroupSizing::ActualItems,
            check_statement: true,
            statement_timeout_ms: 0,
        }
    }
}

/// Source of the row-group count for a rewritten statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSizing {
    /// One row-group per item actually in the group
    ActualItems,
    /// Always the configured batch size, even for a short final group.
    ///
    /// Over-generates placeholders for the last statement when the item
    /// count is not a multiple of the batch size.
    ConfiguredBatchSize,
}

impl GroupSizing {
    /// Row-groups to emit for a group of `group_len` items
    pub fn row_groups(self, group_len: usize, batch_size: usize) -> usize {
        match self {
            GroupSizing::ActualItems => group_len,
            GroupSizing::ConfiguredBatchSize => batch_size,
        }
    }
}

impl Default for GroupSizing {
    fn default() -> Self {
        Self::ActualItems
    }
}
