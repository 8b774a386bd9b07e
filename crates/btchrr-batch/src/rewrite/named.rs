use btchrr_core::{BtchrrError, Result};

use super::{BatchedStatement, RewriteStrategy, ValuesTemplate};

/// `:name` / `@name` placeholders.
///
/// Repeating a named tuple would bind every row to the same names, so this
/// strategy refuses instead of producing a statement that looks valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedRewriter;

impl RewriteStrategy for NamedRewriter {
    fn placeholders_per_row(&self, _row_source: &str) -> usize {
        0
    }

    fn render_row(&self, _row_source: &str, _row: usize, _per_row: usize, _out: &mut String) {}

    fn rewrite(&self, _template: &ValuesTemplate<'_>, _rows: usize) -> Result<BatchedStatement> {
        Err(BtchrrError::UnsupportedDialect(
            "named placeholders are not implemented".into(),
        ))
    }
}
