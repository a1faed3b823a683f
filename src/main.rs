//! drive_fetch CLI - Download a publicly shared Google Drive file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use drive_fetch::logging::init_logging;
use drive_fetch::models::format_size;
use drive_fetch::{
    DriveClient, FetchConfig, FlowState, Outcome, RetrievalFlow, UnrecognizedUrlPolicy,
};

/// Download a file shared as "Anyone with the link" from Google Drive.
#[derive(Parser)]
#[command(name = "drive_fetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Google Drive file URL or file ID. Omit to start the interactive prompt.
    input: Option<String>,

    /// Local destination path (file or directory).
    #[arg(long, short = 't', default_value = ".")]
    to: PathBuf,

    /// Path to a TOML config file.
    #[arg(long, env = "DRIVE_FETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory downloads are written to before saving.
    #[arg(long, env = "DRIVE_FETCH_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Leave downloaded files in the work directory.
    #[arg(long)]
    keep_files: bool,

    /// What to do with a Drive link that has no recognizable file ID.
    #[arg(long, value_enum)]
    unrecognized_url: Option<UnrecognizedUrlPolicy>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Verbose logging (overridden by RUST_LOG).
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    /// Config file first, then flags on top.
    fn load_config(&self) -> Result<FetchConfig> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None => FetchConfig::default(),
        };

        if let Some(dir) = &self.work_dir {
            config.work_dir = Some(dir.clone());
        }
        if self.keep_files {
            config.keep_files = true;
        }
        if let Some(policy) = self.unrecognized_url {
            config.unrecognized_url = policy;
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.load_config()?;
    tracing::debug!(?config, "configuration loaded");

    let client = DriveClient::with_options(config.timeout(), &config.user_agent)
        .context("Failed to create HTTP client")?;
    let flow = RetrievalFlow::new(client, config.storage_policy())
        .with_unrecognized_url(config.unrecognized_url);

    match cli.input {
        Some(input) => run_once(&flow, &input, &cli.to).await,
        None => run_interactive(&flow, &cli.to).await,
    }
}

/// Fetch a single file and save it to `to`.
async fn run_once(flow: &RetrievalFlow<DriveClient>, input: &str, to: &Path) -> Result<()> {
    match flow.attempt(input, spinner_observer()).await {
        Outcome::Success(delivery) => {
            println!("{} ({})", delivery.success_message(), format_size(delivery.size()));
            let saved = delivery
                .save_to(to)
                .await
                .with_context(|| format!("Failed to save file to {:?}", to))?;
            println!("Saved to: {:?}", saved);
            Ok(())
        }
        Outcome::Failed(message) => anyhow::bail!(message),
    }
}

/// Prompt for links until EOF or `quit`, one independent attempt each.
async fn run_interactive(flow: &RetrievalFlow<DriveClient>, to: &Path) -> Result<()> {
    println!("Google Drive File Downloader");
    println!();
    println!("Paste a Google Drive file URL or File ID below.");
    println!("Make sure the file is shared as: Anyone with the link -> Viewer.");
    println!("Type 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(input) = prompt(&mut lines, "\nGoogle Drive file URL or File ID: ").await? else {
            break;
        };
        if matches!(input.trim(), "quit" | "exit") {
            break;
        }

        let delivery = match flow.attempt(&input, spinner_observer()).await {
            Outcome::Success(delivery) => delivery,
            Outcome::Failed(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        println!("{} ({})", delivery.success_message(), format_size(delivery.size()));

        let suggested = if to.is_dir() {
            to.join(delivery.file_name())
        } else {
            to.to_path_buf()
        };
        let question = format!("Save as [{}] (or 'skip'): ", suggested.display());
        let Some(answer) = prompt(&mut lines, &question).await? else {
            break;
        };

        let answer = answer.trim();
        if answer == "skip" {
            continue;
        }
        let target = if answer.is_empty() {
            suggested
        } else {
            PathBuf::from(answer)
        };

        match delivery.save_to(&target).await {
            Ok(saved) => println!("Saved to: {:?}", saved),
            Err(e) => eprintln!("Failed to save file: {}", e),
        }
    }

    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<Option<String>> {
    print!("{}", question);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

/// Show a spinner while the attempt is fetching.
fn spinner_observer() -> impl FnMut(FlowState) + Send {
    let mut spinner: Option<ProgressBar> = None;

    move |state| match state {
        FlowState::Fetching => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Downloading from Google Drive...");
            pb.enable_steady_tick(Duration::from_millis(100));
            spinner = Some(pb);
        }
        FlowState::Success | FlowState::Failed => {
            if let Some(pb) = spinner.take() {
                pb.finish_and_clear();
            }
        }
        FlowState::Idle => {}
    }
}
