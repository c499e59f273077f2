//! Import tracking, the shared symbol caches and the rescan pipeline.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::builtins;
use crate::hints::{HintItem, HintOrigin, HintPriority};
use crate::partials::{PartialError, PartialHandle, PartialSource};
use crate::scan;
use crate::text::strip_comments;

/// Extensions an extension-less import target expands into.
pub const SUPPORTED_EXTENSIONS: [&str; 1] = ["scss"];

/// Import targets in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    paths: Vec<String>,
}

impl ImportSet {
    pub fn new(paths: Vec<String>) -> ImportSet {
        ImportSet { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Same targets in the same order.
    pub fn same_as(&self, paths: &[String]) -> bool {
        self.paths == paths
    }
}

/// Collect the document's import targets, expanding extension-less ones with
/// every supported extension. Commented-out imports do not count.
pub fn import_targets(text: &str) -> Vec<String> {
    let stripped = strip_comments(text, false);
    let mut targets = Vec::new();
    for target in scan::scan_imports(&stripped) {
        if Path::new(&target).extension().is_some() {
            targets.push(target);
        } else {
            for ext in SUPPORTED_EXTENSIONS {
                targets.push(format!("{target}.{ext}"));
            }
        }
    }
    targets
}

/// Symbols extracted from one fetched partial.
#[derive(Debug)]
pub struct PartialSymbols {
    pub handle: PartialHandle,
    pub variables: Vec<HintItem>,
    pub mixins: Vec<HintItem>,
    pub functions: Vec<HintItem>,
}

/// Extract a partial's shareable symbols: functions first, mixins over the
/// text with function blocks excised, then variables over what remains.
/// Stripping between passes keeps block-local declarations out of the
/// variable cache.
pub fn extract_partial_symbols(
    text: &str,
    origin_name: &str,
) -> (Vec<HintItem>, Vec<HintItem>, Vec<HintItem>) {
    let origin = HintOrigin::Import(origin_name.to_string());
    let stripped = strip_comments(text, false);
    let functions = scan::extract_functions(&stripped, &origin, HintPriority::Low, true);
    let after_functions = functions.remaining.unwrap_or(stripped);
    let mixins = scan::extract_mixins(&after_functions, &origin, HintPriority::Low, true);
    let after_mixins = mixins.remaining.unwrap_or(after_functions);
    let variables = scan::extract_variables(&after_mixins, &origin, HintPriority::Low);
    (variables, mixins.symbols, functions.symbols)
}

#[derive(Default)]
struct CacheState {
    imports: ImportSet,
    variables: Vec<HintItem>,
    mixins: Vec<HintItem>,
    functions: Vec<HintItem>,
    resolved: Vec<PartialHandle>,
}

/// Symbol caches shared between hint queries and in-flight rescans.
///
/// Every mutation happens under the write lock, and the generation counter
/// ties a rescan's eventual commit to the clear that started it. A commit
/// carrying a stale generation publishes nothing, so caches only ever hold
/// symbols from one import set.
#[derive(Default)]
pub struct SymbolCaches {
    state: RwLock<CacheState>,
    generation: AtomicU64,
}

impl SymbolCaches {
    pub fn new() -> SymbolCaches {
        SymbolCaches::default()
    }

    /// Start a rescan: clear the caches, record the new import set and seed
    /// the builtin functions. Returns the generation token the eventual
    /// commit must present.
    pub fn begin_rescan(&self, paths: Vec<String>, seed_builtins: bool) -> u64 {
        let mut state = self.state.write();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = CacheState::default();
        state.imports = ImportSet::new(paths);
        if seed_builtins {
            state.functions.extend(builtins::builtin_function_hints().iter().cloned());
        }
        generation
    }

    /// Publish fetched symbols if `generation` is still current.
    pub fn commit(&self, generation: u64, bundles: Vec<PartialSymbols>) -> bool {
        let mut state = self.state.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        for bundle in bundles {
            state.resolved.push(bundle.handle);
            state.variables.extend(bundle.variables);
            state.mixins.extend(bundle.mixins);
            state.functions.extend(bundle.functions);
        }
        true
    }

    /// Drop everything and invalidate in-flight rescans.
    pub fn clear(&self) {
        let mut state = self.state.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = CacheState::default();
    }

    /// Seed the builtin functions outside a rescan, for documents that
    /// import nothing.
    pub fn ensure_builtins(&self) {
        let mut state = self.state.write();
        if state.functions.iter().any(|h| h.origin == HintOrigin::Builtin) {
            return;
        }
        state.functions.extend(builtins::builtin_function_hints().iter().cloned());
    }

    pub fn imports_match(&self, paths: &[String]) -> bool {
        self.state.read().imports.same_as(paths)
    }

    pub fn import_paths(&self) -> Vec<String> {
        self.state.read().imports.paths.clone()
    }

    pub fn variables(&self) -> Vec<HintItem> {
        self.state.read().variables.clone()
    }

    pub fn mixins(&self) -> Vec<HintItem> {
        self.state.read().mixins.clone()
    }

    pub fn functions(&self) -> Vec<HintItem> {
        self.state.read().functions.clone()
    }

    pub fn resolved_partials(&self) -> Vec<PartialHandle> {
        self.state.read().resolved.clone()
    }
}

/// Outcome of one import rescan.
#[derive(Debug)]
pub enum RescanOutcome {
    /// Import set unchanged (or absent); caches untouched.
    Unchanged,
    /// Caches rebuilt from the current import set.
    Rebuilt { loaded: usize, failures: Vec<PartialError> },
    /// A newer rescan or a cache clear won the race; nothing published.
    Superseded,
}

/// Rescan the document's imports into `caches`.
///
/// The import list is compared against the cached one first; an unchanged
/// list keeps existing symbols, including when every import disappears. A
/// changed list clears the caches up front, then all targets resolve and
/// load concurrently. Unresolvable or unreadable targets are reported and
/// skipped rather than failing the rescan.
pub async fn rescan(
    caches: &SymbolCaches,
    source: &dyn PartialSource,
    base_dir: Option<&Path>,
    common_lib: Option<&Path>,
    show_builtins: bool,
    doc_text: &str,
) -> RescanOutcome {
    let targets = import_targets(doc_text);
    if targets.is_empty() || caches.imports_match(&targets) {
        return RescanOutcome::Unchanged;
    }
    debug!("Import set changed, rescanning {} targets", targets.len());
    let generation = caches.begin_rescan(targets.clone(), show_builtins);

    let jobs = targets.iter().map(|target| async move {
        let Some(handle) = source.resolve(base_dir, common_lib, target) else {
            return Err(PartialError::NotFound { path: target.clone() });
        };
        let text = source.fetch_text(&handle).await?;
        let name = handle
            .location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.clone());
        let (variables, mixins, functions) = extract_partial_symbols(&text, &name);
        Ok(PartialSymbols { handle, variables, mixins, functions })
    });

    let mut bundles = Vec::new();
    let mut failures = Vec::new();
    for result in join_all(jobs).await {
        match result {
            Ok(bundle) => bundles.push(bundle),
            Err(err) => {
                warn!("Skipping import: {}", err);
                failures.push(err);
            }
        }
    }
    let loaded = bundles.len();
    if !caches.commit(generation, bundles) {
        debug!("Rescan superseded before commit");
        return RescanOutcome::Superseded;
    }
    debug!("Rebuilt symbol caches: {} loaded, {} failed", loaded, failures.len());
    RescanOutcome::Rebuilt { loaded, failures }
}
