//! Shared fixtures for integration tests: in-memory partial sources and
//! buffer helpers.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use sass_hints::editor::{CursorPos, EditorContext, ScratchBuffer, LINE_END};
use sass_hints::partials::{PartialError, PartialHandle, PartialSource};

/// Partial set served from memory, keyed by import path.
pub struct MemoryPartials {
    files: HashMap<String, String>,
}

impl MemoryPartials {
    pub fn new(files: &[(&str, &str)]) -> MemoryPartials {
        MemoryPartials {
            files: files
                .iter()
                .map(|(path, text)| (path.to_string(), text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl PartialSource for MemoryPartials {
    fn resolve(
        &self,
        _base_dir: Option<&Path>,
        _common_lib: Option<&Path>,
        import_path: &str,
    ) -> Option<PartialHandle> {
        self.files
            .contains_key(import_path)
            .then(|| PartialHandle { location: PathBuf::from(import_path) })
    }

    async fn fetch_text(&self, handle: &PartialHandle) -> Result<String, PartialError> {
        let key = handle.location.to_string_lossy();
        self.files
            .get(key.as_ref())
            .cloned()
            .ok_or_else(|| PartialError::NotFound { path: key.into_owned() })
    }
}

/// Memory-backed source whose fetches park until the test releases them,
/// so tests can order overlapping rescans deterministically.
pub struct GatedPartials {
    inner: MemoryPartials,
    /// One permit added per fetch that has started.
    pub started: Arc<Semaphore>,
    /// Fetches each take one permit before returning.
    pub release: Arc<Semaphore>,
}

impl GatedPartials {
    pub fn new(files: &[(&str, &str)]) -> GatedPartials {
        GatedPartials {
            inner: MemoryPartials::new(files),
            started: Arc::new(Semaphore::new(0)),
            release: Arc::new(Semaphore::new(0)),
        }
    }
}

#[async_trait]
impl PartialSource for GatedPartials {
    fn resolve(
        &self,
        base_dir: Option<&Path>,
        common_lib: Option<&Path>,
        import_path: &str,
    ) -> Option<PartialHandle> {
        self.inner.resolve(base_dir, common_lib, import_path)
    }

    async fn fetch_text(&self, handle: &PartialHandle) -> Result<String, PartialError> {
        self.started.add_permits(1);
        self.release.acquire().await.unwrap().forget();
        self.inner.fetch_text(handle).await
    }
}

/// Replace a buffer's whole contents.
pub fn set_text(buffer: &ScratchBuffer, text: &str) {
    buffer.replace_range(text, CursorPos::default(), CursorPos::new(usize::MAX, LINE_END));
}
