//! Editor-facing abstraction: line/character addressing and the buffer
//! operations hint queries need.

use std::path::PathBuf;

use parking_lot::RwLock;
use ropey::Rope;
use serde::{Deserialize, Serialize};

/// Sentinel character index meaning "end of the line" in a [`CursorPos`].
pub const LINE_END: usize = usize::MAX;

/// Zero-based line and character position in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPos {
    pub line: usize,
    pub ch: usize,
}

impl CursorPos {
    pub fn new(line: usize, ch: usize) -> CursorPos {
        CursorPos { line, ch }
    }
}

/// What the hint engine needs from a host editor. Positions out of range clip
/// to the nearest valid position, so callers can pass [`LINE_END`] or a
/// viewport line past the end of the document.
pub trait EditorContext: Send + Sync {
    fn text(&self) -> String;
    /// Text between two positions; empty when `to` does not follow `from`.
    fn range(&self, from: CursorPos, to: CursorPos) -> String;
    fn cursor(&self) -> CursorPos;
    /// Replace the span between two positions, leaving the cursor after the
    /// inserted text.
    fn replace_range(&self, text: &str, from: CursorPos, to: CursorPos);
    fn language_id(&self) -> String;
    fn file_path(&self) -> Option<PathBuf>;
    /// Last line the host currently renders; used to bound scans of text
    /// below the cursor.
    fn last_visible_line(&self) -> usize;
}

struct ScratchState {
    text: Rope,
    cursor: CursorPos,
    viewport_end: Option<usize>,
}

/// In-memory [`EditorContext`] over a rope. Hosts without an embedding
/// editor, and the crate's own tests, drive the provider through this.
pub struct ScratchBuffer {
    state: RwLock<ScratchState>,
    language: String,
    path: Option<PathBuf>,
}

impl ScratchBuffer {
    pub fn new(text: &str) -> ScratchBuffer {
        ScratchBuffer {
            state: RwLock::new(ScratchState {
                text: Rope::from_str(text),
                cursor: CursorPos::default(),
                viewport_end: None,
            }),
            language: "scss".to_string(),
            path: None,
        }
    }

    pub fn with_language(mut self, id: &str) -> ScratchBuffer {
        self.language = id.to_string();
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> ScratchBuffer {
        self.path = Some(path.into());
        self
    }

    pub fn set_cursor(&self, pos: CursorPos) {
        self.state.write().cursor = pos;
    }

    /// Pin the rendered viewport to end at `line`; unpinned buffers render to
    /// the last line.
    pub fn set_viewport_end(&self, line: usize) {
        self.state.write().viewport_end = Some(line);
    }

    /// Insert at the cursor, as typing would.
    pub fn insert_at_cursor(&self, text: &str) {
        let cursor = self.cursor();
        self.replace_range(text, cursor, cursor);
    }
}

fn clip(text: &Rope, pos: CursorPos) -> usize {
    let line = pos.line.min(text.len_lines().saturating_sub(1));
    let start = text.line_to_char(line);
    let slice = text.line(line);
    let mut len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
        len -= 1;
    }
    if len > 0 && slice.char(len - 1) == '\r' {
        len -= 1;
    }
    start + pos.ch.min(len)
}

fn to_pos(text: &Rope, idx: usize) -> CursorPos {
    let line = text.char_to_line(idx);
    CursorPos { line, ch: idx - text.line_to_char(line) }
}

impl EditorContext for ScratchBuffer {
    fn text(&self) -> String {
        self.state.read().text.to_string()
    }

    fn range(&self, from: CursorPos, to: CursorPos) -> String {
        let state = self.state.read();
        let start = clip(&state.text, from);
        let end = clip(&state.text, to);
        if end <= start {
            return String::new();
        }
        state.text.slice(start..end).to_string()
    }

    fn cursor(&self) -> CursorPos {
        self.state.read().cursor
    }

    fn replace_range(&self, text: &str, from: CursorPos, to: CursorPos) {
        let mut state = self.state.write();
        let start = clip(&state.text, from);
        let end = clip(&state.text, to);
        if end > start {
            state.text.remove(start..end);
        }
        state.text.insert(start, text);
        state.cursor = to_pos(&state.text, start + text.chars().count());
    }

    fn language_id(&self) -> String {
        self.language.clone()
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn last_visible_line(&self) -> usize {
        let state = self.state.read();
        state
            .viewport_end
            .unwrap_or_else(|| state.text.len_lines().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_reads_between_positions() {
        let buffer = ScratchBuffer::new("$blue: #00f;\nbody { }\n");
        assert_eq!(buffer.range(CursorPos::new(0, 1), CursorPos::new(0, 5)), "blue");
        assert_eq!(buffer.range(CursorPos::new(0, 7), CursorPos::new(1, 4)), "#00f;\nbody");
    }

    #[test]
    fn line_end_sentinel_clips() {
        let buffer = ScratchBuffer::new("abc\ndef\n");
        assert_eq!(buffer.range(CursorPos::new(0, 0), CursorPos::new(0, LINE_END)), "abc");
        assert_eq!(buffer.range(CursorPos::new(0, 0), CursorPos::new(99, LINE_END)), "abc\ndef\n");
    }

    #[test]
    fn reversed_range_is_empty() {
        let buffer = ScratchBuffer::new("abc");
        assert_eq!(buffer.range(CursorPos::new(0, 2), CursorPos::new(0, 1)), "");
    }

    #[test]
    fn replace_moves_cursor_past_insertion() {
        let buffer = ScratchBuffer::new("color: ;\n");
        buffer.replace_range("$blue", CursorPos::new(0, 7), CursorPos::new(0, 7));
        assert_eq!(buffer.text(), "color: $blue;\n");
        assert_eq!(buffer.cursor(), CursorPos::new(0, 12));
    }

    #[test]
    fn replace_spans_lines() {
        let buffer = ScratchBuffer::new("one\ntwo\nthree\n");
        buffer.replace_range("1", CursorPos::new(0, 0), CursorPos::new(1, 3));
        assert_eq!(buffer.text(), "1\nthree\n");
        assert_eq!(buffer.cursor(), CursorPos::new(0, 1));
    }

    #[test]
    fn typing_appends_at_cursor() {
        let buffer = ScratchBuffer::new("");
        buffer.insert_at_cursor("$a");
        buffer.insert_at_cursor(":");
        assert_eq!(buffer.text(), "$a:");
        assert_eq!(buffer.cursor(), CursorPos::new(0, 3));
    }

    #[test]
    fn viewport_defaults_to_last_line() {
        let buffer = ScratchBuffer::new("a\nb\nc");
        assert_eq!(buffer.last_visible_line(), 2);
        buffer.set_viewport_end(1);
        assert_eq!(buffer.last_visible_line(), 1);
    }
}
