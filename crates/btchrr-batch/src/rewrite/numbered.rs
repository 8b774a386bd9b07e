use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use super::RewriteStrategy;
use super::scan::{segments, unquoted};

static NUMBERED_PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("valid regex"));

/// `$n` placeholders, numbered from 1 across the whole statement.
///
/// A row consumes as many values as its highest placeholder number, so
/// `($2, $1)` takes two values per row and `($1, $1)` takes one. Row `r`
/// shifts every `$n` to `$(r * per_row + n)`, keeping the order and
/// repetition of the single-row tuple.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberedRewriter;

fn placeholder_number(caps: &regex::Captures<'_>) -> Option<usize> {
    caps[1].parse().ok()
}

impl RewriteStrategy for NumberedRewriter {
    fn placeholders_per_row(&self, row_source: &str) -> usize {
        unquoted(row_source)
            .flat_map(|segment| NUMBERED_PLACEHOLDER_REGEX.captures_iter(segment.text))
            .filter_map(|caps| placeholder_number(&caps))
            .max()
            .unwrap_or(0)
    }

    fn render_row(&self, row_source: &str, row: usize, per_row: usize, out: &mut String) {
        let shift = row * per_row;
        for segment in segments(row_source) {
            if segment.quoted {
                out.push_str(segment.text);
                continue;
            }
            let mut last = 0;
            for caps in NUMBERED_PLACEHOLDER_REGEX.captures_iter(segment.text) {
                let Some(whole) = caps.get(0) else { continue };
                out.push_str(&segment.text[last..whole.start()]);
                match placeholder_number(&caps) {
                    // Writing to a String cannot fail
                    Some(n) => {
                        let _ = write!(out, "${}", shift + n);
                    }
                    None => out.push_str(whole.as_str()),
                }
                last = whole.end();
            }
            out.push_str(&segment.text[last..]);
        }
    }
}
