//! User preferences controlling hint behavior.

use serde::{Deserialize, Serialize};

/// Settings as editors hand them over; absent fields fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HintConfig {
    /// Master switch; a disabled provider refuses activation.
    pub enabled: bool,
    /// Cap on the ranked hint list per query.
    pub max_hints: usize,
    /// Root directory for shared partials, empty when unset.
    pub common_lib_path: String,
    /// Seed the function cache with the standard function table.
    pub show_builtin_functions: bool,
}

impl Default for HintConfig {
    fn default() -> Self {
        HintConfig {
            enabled: true,
            max_hints: 50,
            common_lib_path: String::new(),
            show_builtin_functions: true,
        }
    }
}
