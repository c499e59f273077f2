//! Import target resolution and retrieval.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartialError {
    #[error("partial not found: {path}")]
    NotFound { path: String },
    #[error("failed to read partial {path}")]
    Fetch {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Resolved location of one import target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialHandle {
    pub location: PathBuf,
}

/// Where partials come from. Scans resolve import targets against the
/// document's own directory first, then the configured common library root.
#[async_trait]
pub trait PartialSource: Send + Sync {
    fn resolve(
        &self,
        base_dir: Option<&Path>,
        common_lib: Option<&Path>,
        import_path: &str,
    ) -> Option<PartialHandle>;

    async fn fetch_text(&self, handle: &PartialHandle) -> Result<String, PartialError>;
}

/// Filesystem-backed source.
#[derive(Debug, Default)]
pub struct DiskPartialSource;

#[async_trait]
impl PartialSource for DiskPartialSource {
    fn resolve(
        &self,
        base_dir: Option<&Path>,
        common_lib: Option<&Path>,
        import_path: &str,
    ) -> Option<PartialHandle> {
        for root in [base_dir, common_lib].into_iter().flatten() {
            let candidate = root.join(import_path);
            if candidate.is_file() {
                return Some(PartialHandle { location: candidate });
            }
        }
        None
    }

    async fn fetch_text(&self, handle: &PartialHandle) -> Result<String, PartialError> {
        tokio::fs::read_to_string(&handle.location)
            .await
            .map_err(|source| PartialError::Fetch {
                path: handle.location.display().to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolve_prefers_document_directory() {
        let base = tempfile::tempdir().unwrap();
        let lib = tempfile::tempdir().unwrap();
        fs::write(base.path().join("colors.scss"), "$a: 1;").unwrap();
        fs::write(lib.path().join("colors.scss"), "$b: 2;").unwrap();

        let source = DiskPartialSource;
        let handle = source
            .resolve(Some(base.path()), Some(lib.path()), "colors.scss")
            .unwrap();
        assert_eq!(handle.location, base.path().join("colors.scss"));
    }

    #[test]
    fn resolve_falls_back_to_common_library() {
        let base = tempfile::tempdir().unwrap();
        let lib = tempfile::tempdir().unwrap();
        fs::write(lib.path().join("grid.scss"), "$cols: 12;").unwrap();

        let source = DiskPartialSource;
        let handle = source
            .resolve(Some(base.path()), Some(lib.path()), "grid.scss")
            .unwrap();
        assert_eq!(handle.location, lib.path().join("grid.scss"));
        assert!(source.resolve(Some(base.path()), None, "grid.scss").is_none());
    }

    #[tokio::test]
    async fn fetch_reports_read_failures() {
        let dir = tempfile::tempdir().unwrap();
        let handle = PartialHandle { location: dir.path().join("gone.scss") };
        let err = DiskPartialSource.fetch_text(&handle).await.unwrap_err();
        assert!(matches!(err, PartialError::Fetch { .. }));
        assert!(err.to_string().contains("gone.scss"));
    }
}
