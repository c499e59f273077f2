//! Block span indexing, cursor scope lookup and local variable resolution.
//!
//! Variable-mode queries work over a flattened text: the comment-stripped
//! prefix up to the cursor joined with the comment-stripped tail of the
//! visible viewport. Offsets into that string are what [`BlockSpan`] records
//! and what [`locate`] searches. The index is rebuilt from scratch for every
//! query; spans are never mutated in place.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::hints::{HintItem, HintKind, HintOrigin, HintPriority};
use crate::scan;
use crate::text::{find_matching_close, remove_spans, strip_comments};

// Looser than the extractor patterns: any definition block delimits scope,
// even one the extractors would reject.
static DEFINITION_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(?:mixin|function)\s+[^{]*\{").expect("definition block pattern"));

/// Offsets delimiting one mixin or function definition in flattened text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Start of the signature (the `@`).
    pub head: usize,
    /// First offset of the body, just after the opening brace.
    pub start: usize,
    /// Offset just past the matching closing brace.
    pub end: usize,
}

/// Flattened text with the cursor's offset into it.
#[derive(Debug)]
pub struct FlattenedView {
    pub text: String,
    pub cursor_offset: usize,
}

/// Join the document prefix and the visible tail into one scannable string.
/// Both fragments are stripped line-preservingly so the cursor offset stays
/// the length of the stripped prefix.
pub fn flatten(prefix: &str, suffix: &str) -> FlattenedView {
    let mut text = strip_comments(prefix, true);
    let cursor_offset = text.len();
    text.push_str(&strip_comments(suffix, true));
    FlattenedView { text, cursor_offset }
}

/// Index every top-level definition block in ascending order.
pub fn block_index(text: &str) -> Vec<BlockSpan> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    while pos <= text.len() {
        let Some(found) = DEFINITION_BLOCK.find_at(text, pos) else {
            break;
        };
        let brace = found.end() - 1;
        let close = find_matching_close(text, brace);
        let end = if close == brace { text.len() } else { close };
        spans.push(BlockSpan { head: found.start(), start: found.end(), end });
        pos = end.max(found.end());
    }
    spans
}

/// Binary-search the span enclosing `offset` (`start <= offset <= end`).
/// Spans must be sorted ascending and non-overlapping, which [`block_index`]
/// guarantees.
pub fn locate(spans: &[BlockSpan], offset: usize) -> Option<usize> {
    let mut lo = 0usize;
    let mut hi = spans.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        let span = spans[mid];
        if offset < span.start {
            hi = mid;
        } else if offset > span.end {
            lo = mid + 1;
        } else {
            return Some(mid);
        }
    }
    None
}

/// Remove every indexed block (head to close) from the text, leaving only
/// top-level declarations for a global scan.
pub fn strip_blocks(text: &str, spans: &[BlockSpan]) -> String {
    let pairs: Vec<(usize, usize)> = spans.iter().map(|s| (s.head, s.end)).collect();
    remove_spans(text, &pairs)
}

/// Resolve the symbols visible inside one definition block.
///
/// Parameters come from the signature at high priority; variables declared in
/// the body come in at medium. A body redefinition of a parameter hands its
/// value to the parameter entry and is dropped, so each name appears once.
/// Output order beyond the parameter list is map-derived.
pub fn resolve_local_scope(block_text: &str, body_offset: usize) -> Vec<HintItem> {
    let signature = &block_text[..body_offset.min(block_text.len())];
    let mut body_vars: FxHashMap<String, HintItem> = FxHashMap::default();
    for var in scan::extract_variables(block_text, &HintOrigin::Local, HintPriority::Medium) {
        body_vars.insert(var.name.clone(), var);
    }
    let mut resolved: Vec<HintItem> = Vec::new();
    for (name, default) in scan::parse_parameters(signature) {
        let mut item =
            HintItem::new(name.clone(), HintKind::Variable, HintOrigin::Local, HintPriority::High);
        item.detail = default;
        if let Some(redefined) = body_vars.remove(&name) {
            item.detail = redefined.detail;
        }
        resolved.push(item);
    }
    resolved.extend(body_vars.into_values());
    resolved
}
