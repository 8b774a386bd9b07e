use std::sync::LazyLock;

use btchrr_core::{BtchrrError, Result};
use regex::Regex;

use super::scan::unquoted;

static VALUES_KEYWORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bvalues\b").expect("valid regex"));

/// A single-row statement split around its `VALUES` clause.
///
/// `INSERT INTO t (a, b) VALUES (?, ?) ON CONFLICT DO NOTHING;` splits into
/// the prefix `INSERT INTO t (a, b) VALUES`, the row source `(?, ?)` and the
/// suffix `ON CONFLICT DO NOTHING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValuesTemplate<'a> {
    prefix: &'a str,
    row_source: &'a str,
    suffix: &'a str,
}

impl<'a> ValuesTemplate<'a> {
    /// Locate the first `VALUES` keyword (case-insensitive, outside quotes)
    /// and the row tuple after it.
    ///
    /// When no balanced tuple follows the keyword, everything after it is
    /// treated as the row source and the suffix is empty.
    pub fn parse(sql: &'a str) -> Result<Self> {
        let sql = sql.trim().trim_end_matches(';').trim_end();
        let keyword_end = unquoted(sql)
            .find_map(|segment| {
                VALUES_KEYWORD_REGEX
                    .find(segment.text)
                    .map(|m| segment.offset + m.end())
            })
            .ok_or(BtchrrError::ValuesClauseNotFound)?;

        let prefix = &sql[..keyword_end];
        let rest = &sql[keyword_end..];

        let (row_source, suffix) = match find_row_tuple(rest) {
            Some((start, end)) => (&rest[start..end], rest[end..].trim()),
            None => (rest.trim(), ""),
        };

        Ok(Self {
            prefix,
            row_source,
            suffix,
        })
    }

    /// Text up to and including the `VALUES` keyword
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// The single-row tuple repeated once per item
    pub fn row_source(&self) -> &'a str {
        self.row_source
    }

    /// Text after the row tuple, without a trailing `;`
    pub fn suffix(&self) -> &'a str {
        self.suffix
    }

    /// Build the final statement around rendered row-groups
    pub(crate) fn assemble(&self, rows: &str) -> String {
        let mut sql =
            String::with_capacity(self.prefix.len() + rows.len() + self.suffix.len() + 3);
        sql.push_str(self.prefix);
        sql.push(' ');
        sql.push_str(rows);
        if !self.suffix.is_empty() {
            sql.push(' ');
            sql.push_str(self.suffix);
        }
        sql.push(';');
        sql
    }
}

/// Byte range of the first balanced `( ... )` in `s`, skipping parentheses
/// inside quotes.
fn find_row_tuple(s: &str) -> Option<(usize, usize)> {
    let mut start = None;
    let mut depth = 0usize;

    for segment in unquoted(s) {
        for (i, c) in segment.text.char_indices() {
            let at = segment.offset + i;
            match c {
                '(' => {
                    start.get_or_insert(at);
                    depth += 1;
                }
                ')' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        return start.map(|start| (start, at + 1));
                    }
                }
                _ => {}
            }
        }
    }
    None
}
