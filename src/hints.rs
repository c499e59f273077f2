//! Hint data model shared across scanning, caching and matching.

use serde::Serialize;

use crate::editor::CursorPos;

/// Kind of entity a hint stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HintKind {
    Variable,
    Mixin,
    Function,
    Keyword,
}

/// Context a symbol was declared in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum HintOrigin {
    /// Declared at the top level of the edited document.
    Global,
    /// Declared inside the block enclosing the cursor.
    Local,
    /// Declared in an imported partial, tagged with that file's name.
    Import(String),
    /// Part of the Sass standard library or the directive keyword set.
    Builtin,
}

/// Display weight applied after match quality when ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
pub enum HintPriority {
    #[default]
    Low,
    Medium,
    High,
}

/// Half-open `[start, end)` character range over a hint name, marking the
/// part of the name a query token matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Composite identity of a symbol within one extraction pass.
pub type SymbolKey = (String, HintOrigin);

/// One declared entity offered as a completion candidate.
///
/// `match_score` and `match_ranges` are transient: they are populated while
/// ranking a query and carry no meaning outside that query's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintItem {
    pub name: String,
    /// Running value for variables, parameter list for mixins and functions.
    pub detail: Option<String>,
    pub kind: HintKind,
    pub origin: HintOrigin,
    pub priority: HintPriority,
    pub match_score: i64,
    pub match_ranges: Vec<MatchSpan>,
}

impl HintItem {
    pub fn new(
        name: impl Into<String>,
        kind: HintKind,
        origin: HintOrigin,
        priority: HintPriority,
    ) -> Self {
        Self {
            name: name.into(),
            detail: None,
            kind,
            origin,
            priority,
            match_score: 0,
            match_ranges: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Ranked hints for one query, with the anchor the host should highlight
/// from when rendering and replacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintList {
    pub hints: Vec<HintItem>,
    pub anchor: CursorPos,
    /// Hosts should preselect the first entry.
    pub select_initial: bool,
}

/// Answer to a hint query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    /// No active session, or the session just ended.
    None,
    /// The session changed shape; re-anchor with `has_hints` and query again.
    Requery,
    Hints(HintList),
}
