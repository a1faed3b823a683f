//! URL parser for extracting Google Drive file IDs from sharing links.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// Marker that identifies a Google Drive link.
const DRIVE_DOMAIN: &str = "drive.google.com";

/// `/file/d/<ID>/view`: the ID runs up to the next `/`.
static PATH_SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([^/]*)").expect("Invalid path segment regex"));

/// `open?id=<ID>` and `uc?id=<ID>&export=download`: the ID runs up to the next `&`.
static QUERY_PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=([^&]*)").expect("Invalid query param regex"));

/// What to do with a Drive link that has neither a `/d/` segment nor an `id=` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UnrecognizedUrlPolicy {
    /// Fail with [`DriveError::UnrecognizedUrl`].
    #[default]
    Reject,
    /// Hand the trimmed input to the fetch step unchanged.
    PassThrough,
}

/// Extract a Google Drive file ID from a URL, or return a bare ID unchanged.
///
/// Supports the following formats:
/// - `https://drive.google.com/file/d/<ID>/view?usp=sharing`
/// - `https://drive.google.com/open?id=<ID>`
/// - `https://drive.google.com/uc?id=<ID>&export=download`
/// - Raw ID string (surrounding whitespace is trimmed)
///
/// The ID itself is not validated; a bad one is only detected by the download.
///
/// # Examples
///
/// ```
/// use drive_fetch::url_parser::extract_id;
///
/// let id = extract_id("https://drive.google.com/file/d/ABC123/view?usp=sharing").unwrap();
/// assert_eq!(id, "ABC123");
///
/// let id = extract_id("  ABC123  ").unwrap();
/// assert_eq!(id, "ABC123");
/// ```
pub fn extract_id(url_or_id: &str) -> Result<String> {
    extract_id_with(url_or_id, UnrecognizedUrlPolicy::default())
}

/// Same as [`extract_id`] with an explicit policy for unrecognized Drive links.
pub fn extract_id_with(url_or_id: &str, policy: UnrecognizedUrlPolicy) -> Result<String> {
    let trimmed = url_or_id.trim();

    if !trimmed.contains(DRIVE_DOMAIN) {
        return Ok(trimmed.to_string());
    }

    // Path segment takes priority over the query parameter.
    if let Some(captures) = PATH_SEGMENT_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Ok(id.as_str().to_string());
        }
    }

    if let Some(captures) = QUERY_PARAM_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Ok(id.as_str().to_string());
        }
    }

    match policy {
        UnrecognizedUrlPolicy::Reject => Err(DriveError::UnrecognizedUrl(trimmed.to_string())),
        UnrecognizedUrlPolicy::PassThrough => {
            tracing::warn!(input = trimmed, "no file ID marker in Drive link, passing through");
            Ok(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_file_url() {
        let url = "https://drive.google.com/file/d/ABC123/view?usp=sharing";
        assert_eq!(extract_id(url).unwrap(), "ABC123");
    }

    #[test]
    fn test_extract_open_url() {
        let url = "https://drive.google.com/open?id=XYZ789";
        assert_eq!(extract_id(url).unwrap(), "XYZ789");
    }

    #[test]
    fn test_extract_uc_url_with_trailing_params() {
        let url = "https://drive.google.com/uc?id=XYZ789&export=download";
        assert_eq!(extract_id(url).unwrap(), "XYZ789");
    }

    #[test]
    fn test_path_segment_wins_over_query() {
        let url = "https://drive.google.com/file/d/PATHID/view?id=QUERYID";
        assert_eq!(extract_id(url).unwrap(), "PATHID");
    }

    #[test]
    fn test_extract_raw_id() {
        assert_eq!(extract_id("  ABC123  ").unwrap(), "ABC123");
    }

    #[test]
    fn test_unrecognized_drive_url() {
        let url = "https://drive.google.com/drive/my-drive";
        assert!(matches!(
            extract_id(url),
            Err(DriveError::UnrecognizedUrl(_))
        ));
        assert_eq!(
            extract_id_with(url, UnrecognizedUrlPolicy::PassThrough).unwrap(),
            url
        );
    }
}
