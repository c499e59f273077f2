//! Declaration scanners over comment-stripped text.
//!
//! Each scanner walks an immutable slice and lazily yields its matches:
//! - [`VariableScan`] finds `$name: value;` declarations anchored to
//!   statement boundaries.
//! - [`SignatureScan`] finds `@mixin`/`@function` signatures and skips past
//!   each block body, so strip and no-strip extraction visit the same set.
//! - [`scan_imports`] collects `@import "path";` targets.
//!
//! The extractor entry points turn scanner output into deduplicated
//! [`HintItem`] lists keyed by `(name, origin)`.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::hints::{HintItem, HintKind, HintOrigin, HintPriority, SymbolKey};
use crate::text::{find_matching_close, remove_spans};

static MIXIN_SIG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@mixin\s+([A-Za-z0-9_-]+)\s*(?:\(([^{(]*)\))?\s*\{")
        .expect("mixin signature pattern")
});

static FUNCTION_SIG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@function\s+([A-Za-z0-9_-]+)\s*\(([^{(]*)\)\s*\{")
        .expect("function signature pattern")
});

// Two quote alternatives because the regex crate has no backreferences.
static IMPORT_STMT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@import\s*(?:"([A-Za-z0-9_./-]+)"|'([A-Za-z0-9_./-]+)');"#)
        .expect("import statement pattern")
});

static PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Za-z0-9_-]+)(?::[ \t]*([^,)\s]+))?").expect("parameter pattern")
});

/// One variable declaration located by [`VariableScan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableMatch {
    /// Offset of the `$`.
    pub offset: usize,
    pub name: String,
    pub value: String,
}

/// Lazily yields `$name: value;` declarations.
///
/// A `$` starts a declaration only at a statement boundary: walking left over
/// spaces and tabs must reach the start of the text, a line break, `;`, `{`
/// or `}`. This keeps parameter lists (`($a, $b: 1)`) and property uses
/// (`top:$h`) out of the results. The value runs from the colon to the next
/// `;` and may not contain a line break.
pub struct VariableScan<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> VariableScan<'t> {
    pub fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'t> Iterator for VariableScan<'t> {
    type Item = VariableMatch;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            if bytes[self.pos] != b'$' {
                self.pos += 1;
                continue;
            }
            let dollar = self.pos;
            self.pos += 1;
            if !at_statement_boundary(bytes, dollar) {
                continue;
            }
            let name_start = dollar + 1;
            let mut i = name_start;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            if i == name_start || i >= bytes.len() || bytes[i] != b':' {
                continue;
            }
            let name_end = i;
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let value_start = i;
            while i < bytes.len() && bytes[i] != b';' && bytes[i] != b'\n' {
                i += 1;
            }
            if i >= bytes.len() || bytes[i] != b';' || i == value_start {
                continue;
            }
            self.pos = i + 1;
            return Some(VariableMatch {
                offset: dollar,
                name: self.text[name_start..name_end].to_string(),
                value: self.text[value_start..i].trim_end().to_string(),
            });
        }
        None
    }
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

fn at_statement_boundary(bytes: &[u8], offset: usize) -> bool {
    let mut i = offset;
    while i > 0 {
        match bytes[i - 1] {
            b' ' | b'\t' => i -= 1,
            b'\n' | b';' | b'{' | b'}' => return true,
            _ => return false,
        }
    }
    true
}

/// One mixin or function signature located by [`SignatureScan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMatch {
    /// Offset of the `@` opening the signature.
    pub head: usize,
    /// Offset just after the opening brace.
    pub body_start: usize,
    /// Offset just past the matching close; end of text when unbalanced.
    pub block_end: usize,
    pub name: String,
    pub params: Option<String>,
}

/// Lazily yields block signatures, resuming after each block's close.
pub struct SignatureScan<'t> {
    text: &'t str,
    pattern: &'static Regex,
    pos: usize,
}

impl<'t> SignatureScan<'t> {
    pub fn mixins(text: &'t str) -> Self {
        Self { text, pattern: &MIXIN_SIG, pos: 0 }
    }

    pub fn functions(text: &'t str) -> Self {
        Self { text, pattern: &FUNCTION_SIG, pos: 0 }
    }
}

impl<'t> Iterator for SignatureScan<'t> {
    type Item = SignatureMatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.text.len() {
            return None;
        }
        let caps = self.pattern.captures_at(self.text, self.pos)?;
        let whole = caps.get(0)?;
        let head = whole.start();
        let body_start = whole.end();
        let brace = body_start - 1;
        let close = find_matching_close(self.text, brace);
        let block_end = if close == brace { self.text.len() } else { close };
        self.pos = block_end.max(body_start);
        Some(SignatureMatch {
            head,
            body_start,
            block_end,
            name: caps[1].to_string(),
            params: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }
}

/// Collect `@import` targets in document order.
pub fn scan_imports(text: &str) -> Vec<String> {
    IMPORT_STMT
        .captures_iter(text)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Parse `$name(: default)?` parameter tokens out of a signature substring.
pub fn parse_parameters(signature: &str) -> Vec<(String, Option<String>)> {
    PARAM
        .captures_iter(signature)
        .map(|caps| {
            (
                caps[1].to_string(),
                caps.get(2).map(|m| m.as_str().to_string()),
            )
        })
        .collect()
}

/// Symbols from one block-aware extraction pass, plus the working text with
/// the matched block bodies excised when strip mode was requested.
#[derive(Debug)]
pub struct BlockExtraction {
    pub symbols: Vec<HintItem>,
    pub remaining: Option<String>,
}

/// Extract variable declarations. A redefinition updates the recorded value
/// instead of inserting a duplicate, matching document-order evaluation.
pub fn extract_variables(
    text: &str,
    origin: &HintOrigin,
    priority: HintPriority,
) -> Vec<HintItem> {
    let mut symbols: Vec<HintItem> = Vec::new();
    let mut seen: FxHashMap<SymbolKey, usize> = FxHashMap::default();
    for var in VariableScan::new(text) {
        let key = (var.name.clone(), origin.clone());
        match seen.get(&key) {
            Some(&idx) => symbols[idx].detail = Some(var.value),
            None => {
                seen.insert(key, symbols.len());
                symbols.push(
                    HintItem::new(var.name, HintKind::Variable, origin.clone(), priority)
                        .with_detail(var.value),
                );
            }
        }
    }
    symbols
}

/// Extract mixin definitions, optionally excising their bodies.
pub fn extract_mixins(
    text: &str,
    origin: &HintOrigin,
    priority: HintPriority,
    strip_bodies: bool,
) -> BlockExtraction {
    extract_signatures(
        SignatureScan::mixins(text),
        HintKind::Mixin,
        text,
        origin,
        priority,
        strip_bodies,
    )
}

/// Extract function definitions, optionally excising their bodies.
pub fn extract_functions(
    text: &str,
    origin: &HintOrigin,
    priority: HintPriority,
    strip_bodies: bool,
) -> BlockExtraction {
    extract_signatures(
        SignatureScan::functions(text),
        HintKind::Function,
        text,
        origin,
        priority,
        strip_bodies,
    )
}

fn extract_signatures(
    scan: SignatureScan<'_>,
    kind: HintKind,
    text: &str,
    origin: &HintOrigin,
    priority: HintPriority,
    strip_bodies: bool,
) -> BlockExtraction {
    let mut symbols: Vec<HintItem> = Vec::new();
    let mut seen: FxHashMap<SymbolKey, usize> = FxHashMap::default();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for sig in scan {
        if strip_bodies {
            spans.push((sig.head, sig.block_end));
        }
        let detail = sig
            .params
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let key = (sig.name.clone(), origin.clone());
        match seen.get(&key) {
            Some(&idx) => symbols[idx].detail = detail,
            None => {
                seen.insert(key, symbols.len());
                let mut item = HintItem::new(sig.name, kind, origin.clone(), priority);
                item.detail = detail;
                symbols.push(item);
            }
        }
    }
    let remaining = strip_bodies.then(|| remove_spans(text, &spans));
    BlockExtraction { symbols, remaining }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn names(items: &[HintItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn redefinition_keeps_one_symbol_with_last_value() {
        let vars = extract_variables("$a: 1; $a: 2;", &HintOrigin::Global, HintPriority::Low);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "a");
        assert_eq!(vars[0].detail.as_deref(), Some("2"));
    }

    #[test]
    fn variable_needs_statement_boundary() {
        let text = "@mixin m($w, $h: 10) { $x: 1; .a{top:$h} }";
        let vars = extract_variables(text, &HintOrigin::Local, HintPriority::Medium);
        assert_eq!(names(&vars), vec!["x"]);
        assert_eq!(vars[0].detail.as_deref(), Some("1"));
    }

    #[test]
    fn variable_value_stops_at_semicolon_not_newline() {
        let vars =
            extract_variables("$a: 1px solid\nred;", &HintOrigin::Global, HintPriority::Low);
        assert!(vars.is_empty(), "a value may not span a line break");
    }

    #[test]
    fn variable_value_may_follow_a_wrapped_colon() {
        let vars = extract_variables("$a:\n  red;", &HintOrigin::Global, HintPriority::Low);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].detail.as_deref(), Some("red"));
    }

    #[test]
    fn variables_allow_url_values() {
        let vars = extract_variables(
            "$bg: url(img/bg.png) no-repeat;",
            &HintOrigin::Global,
            HintPriority::Low,
        );
        assert_eq!(vars[0].detail.as_deref(), Some("url(img/bg.png) no-repeat"));
    }

    #[test]
    fn mixin_extraction_with_and_without_params() {
        let source = indoc! {"
            @mixin plain { color: red; }
            @mixin sized($w, $h: 2px) { width: $w; }
        "};
        let result = extract_mixins(source, &HintOrigin::Global, HintPriority::Low, false);
        assert_eq!(names(&result.symbols), vec!["plain", "sized"]);
        assert_eq!(result.symbols[0].detail, None);
        assert_eq!(result.symbols[1].detail.as_deref(), Some("$w, $h: 2px"));
        assert!(result.remaining.is_none());
    }

    #[test]
    fn strip_mode_matches_no_strip_and_removes_bodies() {
        let source = indoc! {"
            @mixin a { $inner: 1; }
            $between: 2;
            @mixin b($x) { .n { left: $x; } }
        "};
        let kept = extract_mixins(source, &HintOrigin::Global, HintPriority::Low, false);
        let stripped = extract_mixins(source, &HintOrigin::Global, HintPriority::Low, true);
        assert_eq!(names(&kept.symbols), names(&stripped.symbols));
        let remaining = stripped.remaining.as_deref().unwrap_or_default();
        assert!(!remaining.contains("$inner"));
        assert!(remaining.contains("$between"));
    }

    #[test]
    fn unbalanced_block_extends_to_end_of_text() {
        let source = "@mixin broken { $a: 1;\n$later: 2;";
        let result = extract_mixins(source, &HintOrigin::Global, HintPriority::Low, true);
        assert_eq!(names(&result.symbols), vec!["broken"]);
        assert_eq!(result.remaining.as_deref(), Some(""));
    }

    #[test]
    fn function_requires_parameter_list() {
        let source = "@function half($n) { @return $n / 2; }\n@function bare { }";
        let result = extract_functions(source, &HintOrigin::Global, HintPriority::Low, false);
        assert_eq!(names(&result.symbols), vec!["half"]);
    }

    #[test]
    fn duplicate_signatures_update_detail() {
        let source = "@function f($a) { }\n@function f($a, $b) { }";
        let result = extract_functions(source, &HintOrigin::Global, HintPriority::Low, false);
        assert_eq!(result.symbols.len(), 1);
        assert_eq!(result.symbols[0].detail.as_deref(), Some("$a, $b"));
    }

    #[test]
    fn imports_accept_both_quote_forms() {
        let source = indoc! {r#"
            @import "partials/vars.scss";
            @import 'mixins';
        "#};
        assert_eq!(scan_imports(source), vec!["partials/vars.scss", "mixins"]);
    }

    #[test]
    fn import_requires_terminator_and_matching_quotes() {
        assert!(scan_imports(r#"@import "a.scss""#).is_empty());
        assert!(scan_imports(r#"@import "a.scss';"#).is_empty());
    }

    #[test]
    fn parameters_with_defaults() {
        let params = parse_parameters("@mixin center($w, $h: 10) {");
        assert_eq!(
            params,
            vec![
                ("w".to_string(), None),
                ("h".to_string(), Some("10".to_string())),
            ]
        );
    }
}
