//! Text primitives shared by every scanning pass: comment stripping,
//! matching-brace lookup and span excision.
//!
//! These functions are total. Malformed input (an unterminated comment, an
//! unbalanced brace) degrades to a best-effort result instead of failing, so
//! callers never see an error while the user is mid-edit.

use once_cell::sync::Lazy;
use regex::Regex;

/// Block comments (tolerating an unterminated one at end of input) and line
/// comments. The block alternative is first so `/*` is never read as the
/// start of a line comment.
static COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\*(?s:.)*?(?:\*/|\z)|//[^\n]*").expect("comment pattern")
});

/// Remove comments from `text`.
///
/// With `preserve_lines` set, a block comment is replaced by as many newline
/// characters as it spanned, so line numbers (and therefore flattened cursor
/// offsets computed over the result) stay aligned with the original text.
/// Line comments contain no line break and are dropped either way.
pub fn strip_comments(text: &str, preserve_lines: bool) -> String {
    if preserve_lines {
        COMMENT
            .replace_all(text, |caps: &regex::Captures| {
                let matched = &caps[0];
                if matched.starts_with("//") {
                    String::new()
                } else {
                    "\n".repeat(matched.matches('\n').count())
                }
            })
            .into_owned()
    } else {
        COMMENT.replace_all(text, "").into_owned()
    }
}

/// Find the offset just past the brace closing the block that opens at or
/// after `from`. Scans only `{` and `}`; a stray close before any open is
/// ignored. Returns `from` unchanged when the text holds no balanced closure,
/// which callers treat as "block extends to the end of available text".
pub fn find_matching_close(text: &str, from: usize) -> usize {
    if from >= text.len() {
        return from;
    }
    let mut depth = 0usize;
    for (i, byte) in text.as_bytes()[from..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return from + i + 1;
                }
            }
            _ => {}
        }
    }
    from
}

/// Rebuild `text` with the given byte spans excised. Spans must be sorted
/// ascending; overlapping or inverted spans are skipped.
pub fn remove_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0usize;
    for &(start, end) in spans {
        let start = start.min(text.len());
        let end = end.min(text.len());
        if start < pos || end < start {
            continue;
        }
        out.push_str(&text[pos..start]);
        pos = end;
    }
    out.push_str(&text[pos..]);
    out
}
