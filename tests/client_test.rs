//! Tests for DriveClient with mocked HTTP responses.

use mockito::{Matcher, Server, ServerGuard};
use tempfile::TempDir;

use drive_fetch::error::DriveError;
use drive_fetch::{DriveClient, Fetcher};

fn client_for(server: &ServerGuard) -> DriveClient {
    DriveClient::new()
        .unwrap()
        .with_endpoints(
            &format!("{}/uc", server.url()),
            &format!("{}/download", server.url()),
        )
}

fn uc_query(id: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("id".into(), id.into()),
        Matcher::UrlEncoded("export".into(), "download".into()),
    ])
}

mod direct_download {
    use super::*;

    #[tokio::test]
    async fn saves_body_under_content_disposition_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/uc")
            .match_query(uc_query("ABC123"))
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_header("content-disposition", "attachment; filename=\"report.pdf\"")
            .with_body("pdf bytes")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let file = client_for(&server)
            .download_file("ABC123", dir.path())
            .await
            .unwrap()
            .expect("file should be downloaded");

        mock.assert_async().await;
        assert_eq!(file.id, "ABC123");
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.size, 9);
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(file.path, dir.path().join("report.pdf"));
        assert_eq!(std::fs::read(&file.path).unwrap(), b"pdf bytes");
    }

    #[tokio::test]
    async fn falls_back_to_id_without_content_disposition() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/uc")
            .match_query(uc_query("XYZ789"))
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body(vec![0u8, 1, 2, 3])
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = client_for(&server)
            .fetch("XYZ789", dir.path())
            .await
            .unwrap()
            .expect("path should be returned");

        assert_eq!(path, dir.path().join("XYZ789"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0u8, 1, 2, 3]);
    }
}

mod virus_scan_warning {
    use super::*;

    const WARNING_PAGE: &str = r#"<html><body>
        <p>Google Drive can't scan this file for viruses.</p>
        <form id="download-form" action="https://drive.usercontent.google.com/download" method="get">
            <input type="hidden" name="id" value="BIG1">
            <input type="hidden" name="export" value="download">
            <input type="hidden" name="confirm" value="t">
            <input type="hidden" name="uuid" value="4f0c2a1e-1b2c-4d3e-8f90-a1b2c3d4e5f6">
        </form></body></html>"#;

    #[tokio::test]
    async fn follows_confirmation_form() {
        let mut server = Server::new_async().await;
        let warning = server
            .mock("GET", "/uc")
            .match_query(uc_query("BIG1"))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(WARNING_PAGE)
            .create_async()
            .await;
        let confirmed = server
            .mock("GET", "/download")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "BIG1".into()),
                Matcher::UrlEncoded("confirm".into(), "t".into()),
                Matcher::UrlEncoded(
                    "uuid".into(),
                    "4f0c2a1e-1b2c-4d3e-8f90-a1b2c3d4e5f6".into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/zip")
            .with_header("content-disposition", "attachment; filename=\"big.zip\"")
            .with_body("zip bytes")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let file = client_for(&server)
            .download_file("BIG1", dir.path())
            .await
            .unwrap()
            .expect("file should be downloaded");

        warning.assert_async().await;
        confirmed.assert_async().await;
        assert_eq!(file.name, "big.zip");
        assert_eq!(std::fs::read(&file.path).unwrap(), b"zip bytes");
    }

    #[tokio::test]
    async fn confirm_token_without_uuid() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/uc")
            .match_query(uc_query("OLD1"))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<form><input type="hidden" name="confirm" value="x9Yz"></form>"#)
            .create_async()
            .await;
        let confirmed = server
            .mock("GET", "/download")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "OLD1".into()),
                Matcher::UrlEncoded("confirm".into(), "x9Yz".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body("old bytes")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = client_for(&server)
            .fetch("OLD1", dir.path())
            .await
            .unwrap()
            .expect("file should be downloaded");

        confirmed.assert_async().await;
        assert_eq!(std::fs::read(&path).unwrap(), b"old bytes");
    }

    #[tokio::test]
    async fn html_after_confirmation_is_absence() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/uc")
            .match_query(uc_query("BIG1"))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(WARNING_PAGE)
            .create_async()
            .await;
        server
            .mock("GET", "/download")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>Quota exceeded</html>")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let result = client_for(&server).fetch("BIG1", dir.path()).await.unwrap();
        assert!(result.is_none());
    }
}

mod inaccessible_files {
    use super::*;

    #[tokio::test]
    async fn not_found_is_absence() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/uc")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let result = client_for(&server).fetch("MISSING", dir.path()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn sign_in_page_is_absence() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/uc")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><title>Sign in - Google Accounts</title></html>")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let result = client_for(&server).fetch("PRIVATE", dir.path()).await.unwrap();
        assert!(result.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn server_error_is_raised() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/uc")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("backend unavailable")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let err = client_for(&server).fetch("ABC123", dir.path()).await.unwrap_err();
        match err {
            DriveError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("backend unavailable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

mod error_handling {
    use drive_fetch::error::DriveError;

    #[test]
    fn test_error_display() {
        let err = DriveError::ApiError {
            status: 502,
            message: "Bad gateway".to_string(),
        };

        let display = format!("{}", err);
        assert!(display.contains("502"));
        assert!(display.contains("Bad gateway"));
    }

    #[test]
    fn test_unrecognized_url_error() {
        let err = DriveError::UnrecognizedUrl("https://drive.google.com/".to_string());
        assert!(err.to_string().contains("https://drive.google.com/"));
    }
}
