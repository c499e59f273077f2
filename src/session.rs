//! Completion session state: trigger modes, invocation recognition and the
//! anchor regression rule.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::editor::CursorPos;
use crate::hints::HintItem;

static INVOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([$@:][A-Za-z0-9_-]*)\s*([A-Za-z0-9_-]*)$").expect("invocation pattern")
});

/// Which family of symbols the active session completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintMode {
    Variable,
    Function,
    Keyword,
    Mixin,
}

impl HintMode {
    /// Map a typed trigger character to its mode. Mixin mode is never entered
    /// from a trigger; it is reached through `@include` handling.
    pub fn from_trigger(ch: char) -> Option<HintMode> {
        match ch {
            '$' => Some(HintMode::Variable),
            '@' => Some(HintMode::Keyword),
            ':' => Some(HintMode::Function),
            _ => None,
        }
    }
}

/// A completion site recognized in the text left of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub mode: HintMode,
    /// How many characters the anchor sits behind the cursor.
    pub token_back: usize,
}

/// Scan the line up to the cursor for an in-progress completion site.
///
/// A second word after the sigil group means an argument or value position:
/// `@include fl` completes mixins, any other continuation completes
/// functions. A bare sigil group anchors just past its trigger character.
pub fn parse_invocation(line_to_cursor: &str) -> Option<Invocation> {
    let caps = INVOCATION.captures(line_to_cursor)?;
    let whole = caps.get(0).map_or("", |m| m.as_str());
    let lead = caps.get(1).map_or("", |m| m.as_str());
    let word = caps.get(2).map_or("", |m| m.as_str());
    if !word.is_empty() {
        let mode = if lead == "@include" { HintMode::Mixin } else { HintMode::Function };
        return Some(Invocation { mode, token_back: word.len() });
    }
    let mode = lead.chars().next().and_then(HintMode::from_trigger)?;
    // Whitespace between the sigil group and the cursor stays inside the
    // token, so an `@include ` site re-enters the keyword requery path.
    Some(Invocation { mode, token_back: whole.len() - 1 })
}

/// True when the cursor moved behind the session anchor. Forward movement,
/// including onto later lines, keeps the session alive.
pub fn cursor_regressed(anchor: CursorPos, cursor: CursorPos) -> bool {
    cursor.line < anchor.line || (cursor.line == anchor.line && cursor.ch < anchor.ch)
}

/// Mutable state of one completion session.
#[derive(Debug, Default)]
pub struct Session {
    pub mode: Option<HintMode>,
    pub anchor: CursorPos,
    /// The next query must re-anchor and rebuild the pool, as after an
    /// `@include ` insertion.
    pub force_refresh: bool,
    /// Mode and anchor line of the last pool build; matching queries reuse
    /// the pool instead of rescanning the document.
    pub refreshed: Option<(HintMode, usize)>,
    pub pool: Vec<HintItem>,
}

impl Session {
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}
