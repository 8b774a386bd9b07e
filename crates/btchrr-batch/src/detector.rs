//! Placeholder dialect detection

use std::fmt;

use btchrr_core::{BtchrrError, Result};

use crate::rewrite::{AnonymousRewriter, NamedRewriter, NumberedRewriter, RewriteStrategy};

/// The placeholder notation a statement template uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderDialect {
    /// `?` repeated, no numbering - SQLite, MySQL
    Anonymous,
    /// `$1`, `$2`, ... numbered across the whole statement - PostgreSQL
    Numbered,
    /// `:name` or `@name` - rewriting is not supported
    Named,
}

impl PlaceholderDialect {
    /// The rewriting strategy for this dialect
    pub fn strategy(self) -> &'static dyn RewriteStrategy {
        match self {
            PlaceholderDialect::Anonymous => &AnonymousRewriter,
            PlaceholderDialect::Numbered => &NumberedRewriter,
            PlaceholderDialect::Named => &NamedRewriter,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaceholderDialect::Anonymous => "anonymous",
            PlaceholderDialect::Numbered => "numbered",
            PlaceholderDialect::Named => "named",
        }
    }
}

impl fmt::Display for PlaceholderDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Recognised placeholder symbols, in no particular priority: detection
/// picks whichever appears first in the statement.
pub const PLACEHOLDER_SYMBOLS: [(char, PlaceholderDialect); 4] = [
    ('?', PlaceholderDialect::Anonymous),
    ('$', PlaceholderDialect::Numbered),
    (':', PlaceholderDialect::Named),
    ('@', PlaceholderDialect::Named),
];

fn dialect_for_symbol(c: char) -> Option<PlaceholderDialect> {
    PLACEHOLDER_SYMBOLS
        .iter()
        .find(|(symbol, _)| *symbol == c)
        .map(|(_, dialect)| *dialect)
}

/// Classify the placeholder dialect of `sql` by the first recognised symbol.
///
/// This is a character scan, not a tokenizer: a symbol inside a string
/// literal or a `::` cast counts, and statements mixing styles are
/// classified by whichever symbol comes first.
pub fn detect_dialect(sql: &str) -> Result<PlaceholderDialect> {
    sql.chars()
        .find_map(dialect_for_symbol)
        .ok_or(BtchrrError::PlaceholderDetection)
}
