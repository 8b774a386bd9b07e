use super::RewriteStrategy;
use super::scan::unquoted;

/// `?` placeholders; every row-group is a verbatim copy of the row tuple
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousRewriter;

impl RewriteStrategy for AnonymousRewriter {
    fn placeholders_per_row(&self, row_source: &str) -> usize {
        unquoted(row_source)
            .map(|segment| segment.text.matches('?').count())
            .sum()
    }

    fn render_row(&self, row_source: &str, _row: usize, _per_row: usize, out: &mut String) {
        out.push_str(row_source);
    }
}
