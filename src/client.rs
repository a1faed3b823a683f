//! Google Drive client for files shared as "anyone with the link".

use std::path::{Path, PathBuf};
use std::pin::pin;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use regex::Regex;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

use crate::error::{DriveError, Result};
use crate::fetcher::Fetcher;
use crate::filename::derive_filename;
use crate::models::FetchedFile;

/// Public download endpoint for shared files.
const DOWNLOAD_URL: &str = "https://drive.google.com/uc";

/// Endpoint the large-file virus scan warning submits to.
const CONFIRM_URL: &str = "https://drive.usercontent.google.com/download";

/// Default timeout for a whole request, body included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_USER_AGENT: &str = concat!("drive_fetch/", env!("CARGO_PKG_VERSION"));

static UUID_FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="uuid"\s+value="([^"]+)""#).expect("Invalid uuid field regex")
});

static CONFIRM_FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="confirm"\s+value="([^"]+)""#).expect("Invalid confirm field regex")
});

static BARE_UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})""#)
        .expect("Invalid uuid regex")
});

/// Client for downloading publicly shared Google Drive files.
pub struct DriveClient {
    http: Client,
    download_url: String,
    confirm_url: String,
}

impl DriveClient {
    /// Create a client with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a client with an explicit request timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http,
            download_url: DOWNLOAD_URL.to_string(),
            confirm_url: CONFIRM_URL.to_string(),
        })
    }

    /// Point the client at different endpoints (used by tests).
    pub fn with_endpoints(mut self, download_url: &str, confirm_url: &str) -> Self {
        self.download_url = download_url.to_string();
        self.confirm_url = confirm_url.to_string();
        self
    }

    /// Download a file into `dest_dir`.
    ///
    /// Returns `Ok(None)` when Drive will not hand the file out: it does not
    /// exist, is not shared publicly, or the confirmation step led nowhere.
    ///
    /// # Arguments
    /// * `file_id` - The ID of the file to download
    /// * `dest_dir` - Directory the file is written into
    pub async fn download_file(&self, file_id: &str, dest_dir: &Path) -> Result<Option<FetchedFile>> {
        tracing::debug!(file_id, "requesting file from Google Drive");

        let response = self
            .http
            .get(&self.download_url)
            .query(&[("export", "download"), ("id", file_id)])
            .send()
            .await?;

        let Some(response) = check_status(response).await? else {
            return Ok(None);
        };

        let response = if is_html(&response) {
            // Either the virus scan warning for large files, or a sign-in / error page.
            let page = response.text().await?;
            let Some(params) = confirmation_params(&page) else {
                tracing::debug!(file_id, "HTML page without a download confirmation");
                return Ok(None);
            };

            tracing::debug!(file_id, "confirming virus scan warning");
            let confirmed = self
                .http
                .get(&self.confirm_url)
                .query(&[("id", file_id), ("export", "download")])
                .query(&params)
                .send()
                .await?;

            match check_status(confirmed).await? {
                Some(confirmed) if !is_html(&confirmed) => confirmed,
                _ => return Ok(None),
            }
        } else {
            response
        };

        let file = write_body(response, file_id, dest_dir).await?;
        tracing::info!(%file, "file downloaded");
        Ok(Some(file))
    }
}

#[async_trait]
impl Fetcher for DriveClient {
    async fn fetch(&self, file_id: &str, dest_dir: &Path) -> Result<Option<PathBuf>> {
        Ok(self
            .download_file(file_id, dest_dir)
            .await?
            .map(|file| file.path))
    }
}

/// Map access-denied statuses to `None` and other failures to an error.
async fn check_status(response: Response) -> Result<Option<Response>> {
    let status = response.status();
    if status.is_success() {
        return Ok(Some(response));
    }

    if matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
    ) {
        tracing::debug!(status = status.as_u16(), "file not accessible");
        return Ok(None);
    }

    let message = response.text().await.unwrap_or_default();
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message,
    })
}

fn header_str(response: &Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_html(response: &Response) -> bool {
    header_str(response, CONTENT_TYPE).is_some_and(|v| v.trim_start().starts_with("text/html"))
}

/// Query parameters that get past the virus scan warning, if the page has any.
fn confirmation_params(page: &str) -> Option<Vec<(&'static str, String)>> {
    let uuid = UUID_FIELD_REGEX
        .captures(page)
        .or_else(|| BARE_UUID_REGEX.captures(page))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    if let Some(uuid) = uuid {
        return Some(vec![("confirm", "t".to_string()), ("uuid", uuid)]);
    }

    CONFIRM_FIELD_REGEX
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| vec![("confirm", m.as_str().to_string())])
}

/// Stream the response body to `dest_dir`, named after `Content-Disposition`.
async fn write_body(response: Response, file_id: &str, dest_dir: &Path) -> Result<FetchedFile> {
    let name = derive_filename(header_str(&response, CONTENT_DISPOSITION).as_deref(), file_id);
    let content_type = header_str(&response, CONTENT_TYPE);
    let path = dest_dir.join(&name);

    let stream = response.bytes_stream().map_err(std::io::Error::other);
    let mut reader = pin!(StreamReader::new(stream));
    let mut file = File::create(&path).await?;

    let copied = tokio::io::copy(&mut reader, &mut file).await;
    let size = match copied {
        Ok(size) => size,
        Err(e) => {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }
    };
    file.flush().await?;

    Ok(FetchedFile {
        id: file_id.to_string(),
        name,
        size,
        content_type,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_from_form_fields() {
        let page = r#"<form action="https://drive.usercontent.google.com/download">
            <input type="hidden" name="id" value="ABC">
            <input type="hidden" name="confirm" value="t">
            <input type="hidden" name="uuid" value="0a1b2c3d-0000-1111-2222-333344445555">
        </form>"#;

        let params = confirmation_params(page).unwrap();
        assert_eq!(
            params,
            vec![
                ("confirm", "t".to_string()),
                ("uuid", "0a1b2c3d-0000-1111-2222-333344445555".to_string()),
            ]
        );
    }

    #[test]
    fn test_confirmation_token_only() {
        let page = r#"<input type="hidden" name="confirm" value="x9Yz">"#;
        assert_eq!(
            confirmation_params(page).unwrap(),
            vec![("confirm", "x9Yz".to_string())]
        );
    }

    #[test]
    fn test_no_confirmation_on_sign_in_page() {
        let page = "<html><title>Sign in - Google Accounts</title></html>";
        assert!(confirmation_params(page).is_none());
    }
}
