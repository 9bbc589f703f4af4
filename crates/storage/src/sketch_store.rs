use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::SketchImage;

use crate::repository::StorageError;

/// Destination for uploaded sketches.
#[async_trait]
pub trait SketchStore: Send + Sync {
    /// The path every upload is written to.
    fn target(&self) -> &Path;

    /// Replace the stored sketch with `image`, returning where it was written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::File` if the file cannot be written.
    async fn save(&self, image: &SketchImage) -> Result<PathBuf, StorageError>;
}

/// Writes every upload to one fixed file.
///
/// Content goes to a sibling temporary file first and is then renamed over
/// the target, so readers see either the old or the new image in full.
#[derive(Debug, Clone)]
pub struct FsSketchStore {
    path: PathBuf,
}

impl FsSketchStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "sketch".into(), |n| n.to_string_lossy().into_owned());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()))
    }
}

fn file_error(path: &Path, err: &std::io::Error) -> StorageError {
    StorageError::File {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[async_trait]
impl SketchStore for FsSketchStore {
    fn target(&self) -> &Path {
        &self.path
    }

    async fn save(&self, image: &SketchImage) -> Result<PathBuf, StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| file_error(parent, &e))?;
            }
        }

        let staging = self.staging_path();
        if let Err(e) = tokio::fs::write(&staging, image.as_bytes()).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(file_error(&staging, &e));
        }
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(file_error(&self.path, &e));
        }

        tracing::debug!(path = %self.path.display(), bytes = image.len(), "sketch written");
        Ok(self.path.clone())
    }
}
