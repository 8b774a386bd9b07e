//! Splitting statement text around quoted literals and identifiers

/// A run of statement text, either a whole quoted token (quotes included)
/// or the plain text between quoted tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    /// Byte offset of `text` in the scanned string
    pub offset: usize,
    pub text: &'a str,
    pub quoted: bool,
}

/// Split `sql` into plain and quoted segments.
///
/// `'...'`, `"..."` and `` `...` `` are quoted. A doubled quote inside a
/// literal closes and reopens it, which leaves both halves quoted. An
/// unterminated quote runs to the end of the text.
pub(crate) fn segments(sql: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut open: Option<char> = None;

    for (i, c) in sql.char_indices() {
        match open {
            None if matches!(c, '\'' | '"' | '`') => {
                if i > start {
                    out.push(Segment {
                        offset: start,
                        text: &sql[start..i],
                        quoted: false,
                    });
                }
                start = i;
                open = Some(c);
            }
            Some(quote) if c == quote => {
                let end = i + c.len_utf8();
                out.push(Segment {
                    offset: start,
                    text: &sql[start..end],
                    quoted: true,
                });
                start = end;
                open = None;
            }
            _ => {}
        }
    }
    if start < sql.len() {
        out.push(Segment {
            offset: start,
            text: &sql[start..],
            quoted: open.is_some(),
        });
    }
    out
}

/// Segments of `sql` outside any quotes
pub(crate) fn unquoted(sql: &str) -> impl Iterator<Item = Segment<'_>> {
    segments(sql).into_iter().filter(|segment| !segment.quoted)
}
