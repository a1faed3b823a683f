//! Retrieval and delivery: turn user input into a file the user can save.
//!
//! One call to [`RetrievalFlow::attempt`] is one independent attempt:
//! `Idle -> Fetching -> Success | Failed`. Every error is caught here and
//! converted into a single-line message for the user.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{DriveError, Result};
use crate::fetcher::Fetcher;
use crate::models::{FlowState, OCTET_STREAM};
use crate::url_parser::{extract_id_with, UnrecognizedUrlPolicy};

pub const MSG_INPUT_MISSING: &str = "Please paste a file URL or ID first.";
pub const MSG_DOWNLOAD_FAILED: &str = "Download failed. Check sharing permissions and file ID.";

/// Where downloaded files are written and how long they live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoragePolicy {
    /// A fresh directory under the given base per attempt, removed with the [`Delivery`].
    Temporary(PathBuf),
    /// Write straight into the given directory and leave the file there.
    Keep(PathBuf),
}

/// Owns the storage of a delivered file.
#[derive(Debug)]
enum StorageGuard {
    Temporary(TempDir),
    Kept,
}

/// A fetched file, ready to be offered to the user once.
#[derive(Debug)]
pub struct Delivery {
    file_name: String,
    path: PathBuf,
    size: u64,
    storage: StorageGuard,
}

impl Delivery {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content type the file is offered with, whatever it really contains.
    pub fn content_type(&self) -> &'static str {
        OCTET_STREAM
    }

    /// Directory removed together with this delivery, if any.
    pub fn temporary_dir(&self) -> Option<&Path> {
        match &self.storage {
            StorageGuard::Temporary(dir) => Some(dir.path()),
            StorageGuard::Kept => None,
        }
    }

    pub fn success_message(&self) -> String {
        format!("Downloaded: {}", self.file_name)
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Save the file to `destination` (a directory or a file path).
    ///
    /// Consumes the delivery; temporary storage is released afterwards.
    pub async fn save_to<P: AsRef<Path>>(self, destination: P) -> Result<PathBuf> {
        let destination = destination.as_ref();
        let target = if destination.is_dir() {
            destination.join(&self.file_name)
        } else {
            if let Some(parent) = destination.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            destination.to_path_buf()
        };

        // Copying a file onto itself truncates it.
        if !same_file(&self.path, &target).await {
            tokio::fs::copy(&self.path, &target).await?;
        }

        tracing::info!(
            file = %self.file_name,
            target = %target.display(),
            content_type = self.content_type(),
            "file saved"
        );
        Ok(target)
    }
}

/// True when both paths resolve to the same existing file.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Result of one attempt, as shown to the user.
#[derive(Debug)]
pub enum Outcome {
    Success(Delivery),
    Failed(String),
}

/// Convert an error into the message shown to the user.
pub fn user_message(err: &DriveError) -> String {
    match err {
        DriveError::InputMissing => MSG_INPUT_MISSING.to_string(),
        DriveError::DownloadFailed(_) => MSG_DOWNLOAD_FAILED.to_string(),
        other => format!("Error while downloading: {}", other),
    }
}

/// Orchestrates extraction, fetching, and delivery.
pub struct RetrievalFlow<F> {
    fetcher: F,
    storage: StoragePolicy,
    unrecognized_url: UnrecognizedUrlPolicy,
}

impl<F: Fetcher> RetrievalFlow<F> {
    pub fn new(fetcher: F, storage: StoragePolicy) -> Self {
        Self {
            fetcher,
            storage,
            unrecognized_url: UnrecognizedUrlPolicy::default(),
        }
    }

    pub fn with_unrecognized_url(mut self, policy: UnrecognizedUrlPolicy) -> Self {
        self.unrecognized_url = policy;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run one attempt, reporting state changes to `observer`.
    ///
    /// Never fails: errors come back as [`Outcome::Failed`].
    pub async fn attempt<O>(&self, input: &str, mut observer: O) -> Outcome
    where
        O: FnMut(FlowState) + Send,
    {
        observer(FlowState::Idle);
        match self.run_observed(input, &mut observer).await {
            Ok(delivery) => {
                observer(FlowState::Success);
                Outcome::Success(delivery)
            }
            Err(e) => {
                tracing::warn!(error = %e, "attempt failed");
                observer(FlowState::Failed);
                Outcome::Failed(user_message(&e))
            }
        }
    }

    /// Run one attempt and return the typed result.
    pub async fn run(&self, input: &str) -> Result<Delivery> {
        self.run_observed(input, &mut |_| {}).await
    }

    async fn run_observed(
        &self,
        input: &str,
        observer: &mut (dyn FnMut(FlowState) + Send),
    ) -> Result<Delivery> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DriveError::InputMissing);
        }

        let file_id = extract_id_with(input, self.unrecognized_url)?;
        let (dir, storage) = self.prepare_storage().await?;

        tracing::info!(file_id = %file_id, dir = %dir.display(), "fetching from Google Drive");
        observer(FlowState::Fetching);

        let path = match self.fetcher.fetch(&file_id, &dir).await? {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => path,
            Some(path) => {
                tracing::warn!(path = %path.display(), "fetcher reported a path that does not exist");
                return Err(DriveError::DownloadFailed(file_id));
            }
            None => return Err(DriveError::DownloadFailed(file_id)),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_id.clone());
        let size = tokio::fs::metadata(&path).await?.len();

        Ok(Delivery {
            file_name,
            path,
            size,
            storage,
        })
    }

    async fn prepare_storage(&self) -> Result<(PathBuf, StorageGuard)> {
        match &self.storage {
            StoragePolicy::Temporary(base) => {
                tokio::fs::create_dir_all(base).await?;
                let dir = tempfile::Builder::new()
                    .prefix("drive_fetch-")
                    .tempdir_in(base)?;
                Ok((dir.path().to_path_buf(), StorageGuard::Temporary(dir)))
            }
            StoragePolicy::Keep(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                Ok((dir.clone(), StorageGuard::Kept))
            }
        }
    }
}
