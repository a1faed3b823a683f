//! drive_fetch - fetch a publicly shared Google Drive file by link or ID.
//!
//! This library provides:
//! - File ID extraction from Drive sharing links ([`extract_id`])
//! - A public-link download client ([`DriveClient`])
//! - The retrieval flow that validates input, fetches, and hands the file
//!   back for saving ([`RetrievalFlow`])
//!
//! # Example
//!
//! ```no_run
//! use drive_fetch::{DriveClient, FetchConfig, Outcome, RetrievalFlow};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = FetchConfig::default();
//!     let client = DriveClient::with_options(config.timeout(), &config.user_agent)?;
//!     let flow = RetrievalFlow::new(client, config.storage_policy());
//!
//!     match flow
//!         .attempt("https://drive.google.com/file/d/ABC123/view?usp=sharing", |_| {})
//!         .await
//!     {
//!         Outcome::Success(delivery) => {
//!             println!("{}", delivery.success_message());
//!             delivery.save_to(".").await?;
//!         }
//!         Outcome::Failed(message) => eprintln!("{}", message),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod filename;
pub mod flow;
pub mod logging;
pub mod models;
pub mod url_parser;

// Re-exports for convenience
pub use client::DriveClient;
pub use config::FetchConfig;
pub use error::{DriveError, Result};
pub use fetcher::Fetcher;
pub use flow::{Delivery, Outcome, RetrievalFlow, StoragePolicy};
pub use models::{FetchedFile, FlowState};
pub use url_parser::{extract_id, extract_id_with, UnrecognizedUrlPolicy};
