//! Built-in completion sources: at-rule keywords and the standard function
//! table bundled at `data/sass-functions.json`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::hints::{HintItem, HintKind, HintOrigin, HintPriority};

/// At-rule and control keywords offered in keyword mode, without their `@`.
pub const KEYWORDS: [&str; 12] = [
    "import", "mixin", "extend", "function", "include", "media", "if", "return", "for", "each",
    "else", "while",
];

#[derive(Debug, Deserialize)]
struct BuiltinFunction {
    arguments: Vec<String>,
}

/// One hint per documented signature; overloaded functions appear once per
/// argument list. The table ships with the crate, so a parse failure is a
/// build defect rather than a runtime condition.
static BUILTIN_FUNCTIONS: Lazy<Vec<HintItem>> = Lazy::new(|| {
    let table: BTreeMap<String, BuiltinFunction> =
        serde_json::from_str(include_str!("../data/sass-functions.json"))
            .expect("bundled function table parses");
    let mut hints = Vec::new();
    for (name, function) in table {
        if function.arguments.is_empty() {
            hints.push(HintItem::new(
                name.clone(),
                HintKind::Function,
                HintOrigin::Builtin,
                HintPriority::Low,
            ));
            continue;
        }
        for signature in function.arguments {
            hints.push(
                HintItem::new(
                    name.clone(),
                    HintKind::Function,
                    HintOrigin::Builtin,
                    HintPriority::Low,
                )
                .with_detail(signature),
            );
        }
    }
    hints
});

pub fn builtin_function_hints() -> &'static [HintItem] {
    &BUILTIN_FUNCTIONS
}

pub fn keyword_hints() -> Vec<HintItem> {
    KEYWORDS
        .iter()
        .map(|kw| {
            HintItem::new(*kw, HintKind::Keyword, HintOrigin::Builtin, HintPriority::Low)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_table_loads() {
        let hints = builtin_function_hints();
        assert!(!hints.is_empty());
        assert!(hints.iter().all(|h| h.kind == HintKind::Function));
        assert!(hints.iter().all(|h| h.origin == HintOrigin::Builtin));
    }

    #[test]
    fn overloads_become_separate_hints() {
        let rgba: Vec<&HintItem> = builtin_function_hints()
            .iter()
            .filter(|h| h.name == "rgba")
            .collect();
        assert_eq!(rgba.len(), 2);
        assert_ne!(rgba[0].detail, rgba[1].detail);
    }

    #[test]
    fn signatures_ride_in_detail() {
        let darken = builtin_function_hints()
            .iter()
            .find(|h| h.name == "darken")
            .unwrap();
        assert_eq!(darken.detail.as_deref(), Some("$color, $amount"));
    }

    #[test]
    fn keywords_cover_include() {
        let keywords = keyword_hints();
        assert_eq!(keywords.len(), KEYWORDS.len());
        assert!(keywords.iter().any(|h| h.name == "include"));
        assert!(keywords.iter().all(|h| h.kind == HintKind::Keyword && h.detail.is_none()));
    }
}
