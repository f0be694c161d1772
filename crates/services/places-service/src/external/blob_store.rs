//! Uploaded image files.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;

use common::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Remove the file stored under `path`.
    async fn delete(&self, path: &str) -> AppResult<()>;
}

/// Files on the local filesystem, addressed relative to `root`.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(AppError::validation(format!("Invalid image path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        tokio::fs::remove_file(&full_path)
            .await
            .map_err(|e| AppError::internal(format!("Failed to delete {}: {}", full_path.display(), e)))
    }
}

/// Delete images without failing the caller.
///
/// `keep` (the shared default profile image) and empty paths are skipped.
/// Failures are logged and swallowed.
pub async fn discard_images<I>(store: &dyn BlobStore, paths: I, keep: &str)
where
    I: IntoIterator<Item = String>,
{
    let targets: Vec<String> = paths
        .into_iter()
        .filter(|p| !p.is_empty() && p != keep)
        .collect();
    if targets.is_empty() {
        return;
    }

    let results = join_all(targets.iter().map(|p| store.delete(p))).await;
    for (path, result) in targets.iter().zip(results) {
        match result {
            Ok(()) => tracing::debug!(path = %path, "Image deleted"),
            Err(e) => tracing::warn!(path = %path, error = %e, "Failed to delete image"),
        }
    }
}
