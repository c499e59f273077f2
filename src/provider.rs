//! The hint provider: session lifecycle, trigger handling, pool assembly and
//! hint insertion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::builtins;
use crate::config::HintConfig;
use crate::editor::{CursorPos, EditorContext, LINE_END};
use crate::hints::{HintItem, HintList, HintOutcome, HintOrigin, HintPriority};
use crate::imports::{self, RescanOutcome, SymbolCaches, SUPPORTED_EXTENSIONS};
use crate::matcher;
use crate::partials::{DiskPartialSource, PartialSource};
use crate::scan;
use crate::scope;
use crate::session::{self, HintMode, Session};
use crate::text::strip_comments;

/// Completion provider for one host editor at a time.
///
/// Hosts drive it with the session protocol: `has_hints` opens or re-anchors
/// a session, `get_hints` answers queries while it lives, `insert_hint`
/// applies a choice. A [`HintOutcome::Requery`] answer, or `true` from
/// `insert_hint`, asks the host to call `has_hints(None)` and query again.
pub struct SassHintProvider {
    editor: RwLock<Option<Arc<dyn EditorContext>>>,
    source: Arc<dyn PartialSource>,
    config: RwLock<HintConfig>,
    caches: SymbolCaches,
    session: RwLock<Session>,
}

impl SassHintProvider {
    pub fn new(config: HintConfig) -> SassHintProvider {
        SassHintProvider::with_source(config, Arc::new(DiskPartialSource))
    }

    pub fn with_source(config: HintConfig, source: Arc<dyn PartialSource>) -> SassHintProvider {
        SassHintProvider {
            editor: RwLock::new(None),
            source,
            config: RwLock::new(config),
            caches: SymbolCaches::new(),
            session: RwLock::new(Session::default()),
        }
    }

    pub fn caches(&self) -> &SymbolCaches {
        &self.caches
    }

    /// Replace the active settings. Caches and any open session are dropped,
    /// so the next query sees the new settings applied throughout.
    pub fn update_config(&self, config: HintConfig) {
        let show_builtins = config.show_builtin_functions;
        *self.config.write() = config;
        self.caches.clear();
        if show_builtins {
            self.caches.ensure_builtins();
        }
        self.session.write().reset();
    }

    /// Adopt `editor` as the active document. Returns false, leaving state
    /// untouched, when hints are disabled or the document language is not
    /// handled.
    pub fn activate_editor(&self, editor: Arc<dyn EditorContext>) -> bool {
        if !self.config.read().enabled {
            return false;
        }
        let language = editor.language_id();
        if !SUPPORTED_EXTENSIONS.contains(&language.as_str()) {
            debug!("Declining editor with unsupported language {}", language);
            return false;
        }
        *self.editor.write() = Some(editor);
        self.caches.clear();
        self.session.write().reset();
        true
    }

    /// Bring the symbol caches in line with the active document's imports.
    pub async fn rescan_imports(&self) -> RescanOutcome {
        let Some(editor) = self.editor.read().clone() else {
            return RescanOutcome::Unchanged;
        };
        let (common_lib, show_builtins) = {
            let config = self.config.read();
            let common_lib = (!config.common_lib_path.is_empty())
                .then(|| PathBuf::from(&config.common_lib_path));
            (common_lib, config.show_builtin_functions)
        };
        let text = editor.text();
        let base_dir = editor.file_path().and_then(|p| p.parent().map(Path::to_path_buf));
        let outcome = imports::rescan(
            &self.caches,
            self.source.as_ref(),
            base_dir.as_deref(),
            common_lib.as_deref(),
            show_builtins,
            &text,
        )
        .await;
        if show_builtins {
            self.caches.ensure_builtins();
        }
        outcome
    }

    /// Open or re-anchor a session at the current cursor. `trigger` is the
    /// character that prompted the host, or `None` for an explicit
    /// invocation. Always declines while hints are disabled.
    pub fn has_hints(&self, trigger: Option<char>) -> bool {
        if !self.config.read().enabled {
            return false;
        }
        let Some(editor) = self.editor.read().clone() else {
            return false;
        };
        let mut session = self.session.write();
        let cursor = editor.cursor();
        match trigger {
            Some(ch) => {
                let Some(mode) = HintMode::from_trigger(ch) else {
                    session.mode = None;
                    return false;
                };
                session.mode = Some(mode);
                session.anchor = cursor;
                self.refresh_pool(editor.as_ref(), &mut session, false);
                true
            }
            None => {
                if session.force_refresh {
                    session.force_refresh = false;
                    session.anchor = cursor;
                    self.refresh_pool(editor.as_ref(), &mut session, true);
                    return true;
                }
                let line_start = CursorPos::new(cursor.line, 0);
                let line_text = editor.range(line_start, cursor);
                let Some(invocation) = session::parse_invocation(&line_text) else {
                    session.mode = None;
                    return false;
                };
                session.mode = Some(invocation.mode);
                session.anchor =
                    CursorPos::new(cursor.line, cursor.ch.saturating_sub(invocation.token_back));
                self.refresh_pool(editor.as_ref(), &mut session, false);
                true
            }
        }
    }

    /// Answer the current session's query at the cursor.
    pub fn get_hints(&self, trigger: Option<char>) -> HintOutcome {
        let Some(editor) = self.editor.read().clone() else {
            return HintOutcome::None;
        };
        let mut session = self.session.write();
        let Some(mode) = session.mode else {
            return HintOutcome::None;
        };
        let cursor = editor.cursor();
        if session::cursor_regressed(session.anchor, cursor) {
            session.mode = None;
            return HintOutcome::None;
        }
        let mut token = editor.range(session.anchor, cursor);
        if mode == HintMode::Keyword && token == "include " {
            debug!("Include typed out, switching to mixin completion");
            session.mode = Some(HintMode::Mixin);
            session.force_refresh = true;
            return HintOutcome::Requery;
        }
        if matches!(mode, HintMode::Mixin | HintMode::Function) && trigger == Some(' ') {
            token.clear();
            session.anchor.ch += 1;
        }
        let max_hints = self.config.read().max_hints;
        let hints = matcher::rank_hints(&session.pool, &token, max_hints);
        HintOutcome::Hints(HintList { hints, anchor: session.anchor, select_initial: true })
    }

    /// Replace the session token with `hint`. Returns true when the session
    /// stays open and the host should re-anchor and query again.
    pub fn insert_hint(&self, hint: &HintItem) -> bool {
        let Some(editor) = self.editor.read().clone() else {
            return false;
        };
        let mut session = self.session.write();
        let Some(mode) = session.mode else {
            return false;
        };
        let cursor = editor.cursor();
        if mode == HintMode::Keyword && hint.name == "include" {
            editor.replace_range("include ", session.anchor, cursor);
            session.mode = Some(HintMode::Mixin);
            session.force_refresh = true;
            return true;
        }
        editor.replace_range(&hint.name, session.anchor, cursor);
        session.mode = None;
        false
    }

    /// Rebuild the session's candidate pool unless the last build already
    /// covered this mode and anchor line.
    fn refresh_pool(&self, editor: &dyn EditorContext, session: &mut Session, force: bool) {
        let Some(mode) = session.mode else {
            return;
        };
        let key = (mode, session.anchor.line);
        if !force && session.refreshed == Some(key) {
            return;
        }
        session.pool = self.build_pool(editor, mode);
        session.refreshed = Some(key);
        debug!("Collected {} candidates for {:?} completion", session.pool.len(), mode);
    }

    fn build_pool(&self, editor: &dyn EditorContext, mode: HintMode) -> Vec<HintItem> {
        match mode {
            HintMode::Keyword => builtins::keyword_hints(),
            HintMode::Variable => self.variable_pool(editor),
            HintMode::Mixin => {
                let mut pool = self.caches.mixins();
                let text = strip_comments(&editor.text(), false);
                pool.extend(
                    scan::extract_mixins(&text, &HintOrigin::Global, HintPriority::Low, false)
                        .symbols,
                );
                pool
            }
            HintMode::Function => {
                let mut pool = self.caches.functions();
                let text = strip_comments(&editor.text(), false);
                pool.extend(
                    scan::extract_functions(&text, &HintOrigin::Global, HintPriority::Low, false)
                        .symbols,
                );
                pool
            }
        }
    }

    /// Variables come from three places, in pool order: imported partials,
    /// the block enclosing the cursor, and the document's top level. Only
    /// text up to the end of the viewport is scanned.
    fn variable_pool(&self, editor: &dyn EditorContext) -> Vec<HintItem> {
        let cursor = editor.cursor();
        let prefix = editor.range(CursorPos::default(), cursor);
        let tail_end = CursorPos::new(editor.last_visible_line().max(cursor.line), LINE_END);
        let suffix = editor.range(cursor, tail_end);
        let view = scope::flatten(&prefix, &suffix);
        let blocks = scope::block_index(&view.text);

        let mut pool = self.caches.variables();
        if let Some(idx) = scope::locate(&blocks, view.cursor_offset) {
            let span = blocks[idx];
            let block_text = &view.text[span.head..span.end];
            pool.extend(scope::resolve_local_scope(block_text, span.start - span.head));
        }
        let top_level = scope::strip_blocks(&view.text, &blocks);
        pool.extend(scan::extract_variables(
            &top_level,
            &HintOrigin::Global,
            HintPriority::Low,
        ));
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ScratchBuffer;

    fn provider() -> SassHintProvider {
        SassHintProvider::new(HintConfig::default())
    }

    #[test]
    fn activation_requires_enabled_config() {
        let config = HintConfig { enabled: false, ..HintConfig::default() };
        let provider = SassHintProvider::new(config);
        let buffer = Arc::new(ScratchBuffer::new(""));
        assert!(!provider.activate_editor(buffer));
    }

    #[test]
    fn disabling_hints_applies_to_the_active_editor() {
        let provider = provider();
        let buffer = Arc::new(ScratchBuffer::new("width: \n"));
        buffer.set_cursor(CursorPos::new(0, 7));
        assert!(provider.activate_editor(buffer.clone()));

        provider.update_config(HintConfig { enabled: false, ..HintConfig::default() });
        buffer.insert_at_cursor("$");
        assert!(!provider.has_hints(Some('$')), "disabling needs no reactivation");
        assert_eq!(provider.get_hints(None), HintOutcome::None);

        provider.update_config(HintConfig::default());
        assert!(provider.has_hints(Some('$')));
    }

    #[test]
    fn builtin_visibility_follows_config_updates() {
        let provider = provider();
        let off = HintConfig { show_builtin_functions: false, ..HintConfig::default() };
        provider.update_config(off);
        assert!(provider.caches().functions().is_empty());

        provider.update_config(HintConfig::default());
        let functions = provider.caches().functions();
        assert!(functions.iter().any(|f| f.origin == HintOrigin::Builtin));
    }

    #[test]
    fn activation_requires_supported_language() {
        let provider = provider();
        let css = Arc::new(ScratchBuffer::new("").with_language("css"));
        assert!(!provider.activate_editor(css));
        let scss = Arc::new(ScratchBuffer::new(""));
        assert!(provider.activate_editor(scss));
    }

    #[test]
    fn non_trigger_characters_decline() {
        let provider = provider();
        let buffer = Arc::new(ScratchBuffer::new(""));
        assert!(provider.activate_editor(buffer.clone()));
        buffer.insert_at_cursor("p");
        assert!(!provider.has_hints(Some('p')));
        assert_eq!(provider.get_hints(None), HintOutcome::None);
    }

    #[test]
    fn queries_without_a_session_return_nothing() {
        let provider = provider();
        let buffer = Arc::new(ScratchBuffer::new("$blue: #00f;\n"));
        assert!(provider.activate_editor(buffer));
        assert_eq!(provider.get_hints(None), HintOutcome::None);
        let ghost = HintItem::new(
            "blue",
            crate::hints::HintKind::Variable,
            HintOrigin::Global,
            HintPriority::Low,
        );
        assert!(!provider.insert_hint(&ghost));
    }
}
