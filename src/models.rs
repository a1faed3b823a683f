//! Data models shared by the client and the retrieval flow.

use std::path::PathBuf;

/// Content type attached to every file offered back to the user.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Metadata for a file fetched from Google Drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub path: PathBuf,
}

impl std::fmt::Display for FetchedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mime = self.content_type.as_deref().unwrap_or("-");
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.id,
            format_size(self.size),
            mime,
            self.name
        )
    }
}

/// Where an attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Fetching,
    Success,
    Failed,
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
