//! Error types for the drive_fetch crate.

use thiserror::Error;

/// Errors that can occur while resolving and fetching a Google Drive file.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("No file URL or ID was given")]
    InputMissing,

    #[error("Download failed for file ID: {0}")]
    DownloadFailed(String),

    #[error("Unrecognized Google Drive URL: {0}")]
    UnrecognizedUrl(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
