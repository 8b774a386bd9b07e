//! Folding per-batch outcomes into one result

use std::time::Duration;

use btchrr_core::ExecutionOutcome;

/// How the last insert identifier is carried across batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertIdRule {
    /// Keep the most recent positive id in batch order; a batch reporting
    /// zero or no id leaves the previous one in place
    #[default]
    LatestPositive,
}

impl InsertIdRule {
    pub fn apply(self, current: Option<i64>, observed: Option<i64>) -> Option<i64> {
        match self {
            InsertIdRule::LatestPositive => match observed {
                Some(id) if id > 0 => Some(id),
                _ => current,
            },
        }
    }
}

/// Aggregated result of a multi-batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResult {
    /// Rows affected, summed across batches
    pub affected_rows: u64,
    /// Last insert identifier per `InsertIdRule`
    pub last_insert_id: Option<i64>,
    /// Number of batches executed
    pub batches: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
    rule: InsertIdRule,
}

impl AggregatedResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one batch outcome into the result
    pub fn absorb(&mut self, outcome: &ExecutionOutcome) {
        self.affected_rows += outcome.affected_rows;
        self.last_insert_id = self.rule.apply(self.last_insert_id, outcome.last_insert_id);
        self.batches += 1;
    }

    /// Fold a sequence of outcomes in order
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ExecutionOutcome>) -> Self {
        let mut result = Self::new();
        for outcome in outcomes {
            result.absorb(outcome);
        }
        result
    }
}
