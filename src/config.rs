//! Runtime settings, read from an optional TOML file and overridden by CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::client::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::error::Result;
use crate::flow::StoragePolicy;
use crate::url_parser::UnrecognizedUrlPolicy;

/// Settings for fetching files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Directory that holds downloads; the system temp dir when unset.
    pub work_dir: Option<PathBuf>,
    /// Keep downloads in `work_dir` instead of removing them after saving.
    pub keep_files: bool,
    /// Handling of Drive links without a recognizable file ID.
    pub unrecognized_url: UnrecognizedUrlPolicy,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            keep_files: false,
            unrecognized_url: UnrecognizedUrlPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Load settings from a TOML file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Storage policy implied by `keep_files` and `work_dir`.
    pub fn storage_policy(&self) -> StoragePolicy {
        let dir = self.work_dir.clone().unwrap_or_else(std::env::temp_dir);
        if self.keep_files {
            StoragePolicy::Keep(dir)
        } else {
            StoragePolicy::Temporary(dir)
        }
    }
}
