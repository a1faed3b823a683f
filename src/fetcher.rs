//! The fetch seam between the retrieval flow and Google Drive.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

/// Resolves a file ID to a local file.
///
/// `Ok(None)` means the file could not be retrieved (missing, private, or
/// otherwise inaccessible). `Err` is reserved for failures along the way.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, file_id: &str, dest_dir: &Path) -> Result<Option<PathBuf>>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    async fn fetch(&self, file_id: &str, dest_dir: &Path) -> Result<Option<PathBuf>> {
        (**self).fetch(file_id, dest_dir).await
    }
}
