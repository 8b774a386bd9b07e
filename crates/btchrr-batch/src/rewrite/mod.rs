//! Multi-row statement rewriting
//!
//! A statement template is split once into the text up to and including
//! `VALUES`, the first row tuple, and whatever follows it. The row tuple is
//! repeated verbatim once per item, so expressions and literals around the
//! placeholders survive; numbered placeholders are shifted so each row binds
//! its own values.

mod anonymous;
mod named;
mod numbered;
mod scan;
mod template;

use std::fmt;

use btchrr_core::{BtchrrError, Result};

pub use anonymous::AnonymousRewriter;
pub use named::NamedRewriter;
pub use numbered::NumberedRewriter;
pub use template::ValuesTemplate;

/// A rewritten statement covering one group of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchedStatement {
    sql: String,
    row_groups: usize,
    placeholders_per_row: usize,
}

impl BatchedStatement {
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    pub fn into_string(self) -> String {
        self.sql
    }

    /// Number of repeated row-groups in the statement
    pub fn row_groups(&self) -> usize {
        self.row_groups
    }

    pub fn placeholders_per_row(&self) -> usize {
        self.placeholders_per_row
    }

    /// Total bind values the statement expects
    pub fn placeholder_count(&self) -> usize {
        self.row_groups * self.placeholders_per_row
    }
}

impl fmt::Display for BatchedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl AsRef<str> for BatchedStatement {
    fn as_ref(&self) -> &str {
        &self.sql
    }
}

/// How one placeholder dialect turns a template into a multi-row statement
pub trait RewriteStrategy: Send + Sync {
    /// Bind values one row tuple consumes
    fn placeholders_per_row(&self, row_source: &str) -> usize;

    /// Append the row tuple for the zero-based row `row` to `out`
    fn render_row(&self, row_source: &str, row: usize, per_row: usize, out: &mut String);

    /// Rewrite `template` into a statement with `rows` row-groups
    fn rewrite(&self, template: &ValuesTemplate<'_>, rows: usize) -> Result<BatchedStatement> {
        if rows == 0 {
            return Err(BtchrrError::EmptyInput);
        }
        let row_source = template.row_source();
        let per_row = self.placeholders_per_row(row_source);
        if per_row == 0 {
            return Err(BtchrrError::EmptyValuesClause);
        }

        let mut rendered = String::with_capacity(rows * (row_source.len() + 2));
        for row in 0..rows {
            if row > 0 {
                rendered.push_str(", ");
            }
            self.render_row(row_source, row, per_row, &mut rendered);
        }
        Ok(BatchedStatement {
            sql: template.assemble(&rendered),
            row_groups: rows,
            placeholders_per_row: per_row,
        })
    }
}
