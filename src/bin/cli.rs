//! NTIS Digest CLI
//!
//! Local execution entry point for selection, extraction and baseline reconciliation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ntis_digest::{
    config::{load_announcements, load_config},
    error::{AppError, Result},
    models::{Format, OutputRecord, SelectedFile},
    pipeline::{DigestPipeline, Reconciler},
    services::{Extractors, FileSelector, inspect, selector::group_of, signature},
    storage::{BaselineData, BaselineStorage, LocalStorage},
};

/// NTIS Digest - announcement document extraction
#[derive(Parser, Debug)]
#[command(
    name = "ntis-digest",
    version,
    about = "Selects, extracts and digests NTIS announcement attachments"
)]
struct Cli {
    /// Path to storage directory containing config.toml and the baseline
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick the announcement file in a download directory
    Select { directory: PathBuf },

    /// List every candidate file with its signature and validity
    Inspect { directory: PathBuf },

    /// Extract text and overview from a single file
    Extract { file: PathBuf },

    /// Select and extract the announcement file in a directory
    Process {
        directory: PathBuf,

        /// Announcement title for the output record
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Merge a crawled announcement list into the baseline
    Reconcile {
        /// JSON file with crawled announcements
        crawled: PathBuf,

        /// Search keyword recorded on the baseline
        #[arg(long)]
        keyword: Option<String>,

        /// Report new announcements without writing the baseline
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration files
    Validate,

    /// Show current baseline info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.storage_dir)?;
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = LocalStorage::from_config(&cli.storage_dir, &config.store);

    match cli.command {
        Command::Select { directory } => {
            match FileSelector::from_config(&config).select_best(&directory)? {
                Some(selected) => print_json(&selected)?,
                None => log::warn!("No announcement file in {}", directory.display()),
            }
        }

        Command::Inspect { directory } => {
            let candidates = inspect(&directory, &config.selection.title_keywords)?;
            if candidates.is_empty() {
                log::info!("No candidate files in {}", directory.display());
            }
            for c in candidates {
                println!(
                    "{:<6} {:<8} {:>10}  {}  {}  {}",
                    c.declared.as_str(),
                    c.detected.as_str(),
                    c.size,
                    c.signature_hex(),
                    if c.valid { "valid" } else { "INVALID" },
                    c.file_name()
                );
            }
        }

        Command::Extract { file } => {
            let detected = signature::classify(&file);
            let format = group_of(Format::from_path(&file), detected);
            let size = std::fs::metadata(&file)?.len();
            let extractors = Extractors::from_config(&config)?;

            let selected = SelectedFile {
                path: file.clone(),
                format,
                size,
            };
            let result = extractors.extract(&selected).await;
            let title = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            print_json(&OutputRecord::from_extraction(&title, format, &result))?;
        }

        Command::Process { directory, title } => {
            let pipeline = DigestPipeline::from_config(&config)?;
            let (format, result, _) = pipeline.extract_directory(&directory).await?;
            print_json(&OutputRecord::from_extraction(&title, format, &result))?;
        }

        Command::Reconcile {
            crawled,
            keyword,
            dry_run,
        } => {
            let crawled = load_announcements(&crawled)?;
            let baseline = storage.load_baseline().await?;
            let reconciler = Reconciler::from_config(&config.store)?;

            let result = reconciler.reconcile(&crawled, &baseline.announcements);
            let keyword = keyword.unwrap_or_else(|| {
                if baseline.search_keyword.is_empty() {
                    config.store.search_keyword.clone()
                } else {
                    baseline.search_keyword.clone()
                }
            });
            let next = BaselineData::from_reconcile(&result, &keyword, reconciler.identity_key());

            if dry_run {
                log::info!("Dry run: baseline not written");
            } else {
                storage.save_baseline(&next).await?;
            }
            print_json(&result.new_items)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            Reconciler::from_config(&config.store)?;
            Extractors::from_config(&config)?;
            log::info!("✓ Config OK (selection, extraction, overview, store, summary)");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            let path = storage.baseline_path();
            if !path.exists() {
                log::info!("No baseline found yet.");
                return Ok(());
            }
            let data = storage.load_baseline().await?;
            print_json(&data.summary())?;
            if data.announcements.len() > config.store.capacity {
                return Err(AppError::validation(format!(
                    "baseline holds {} announcements, capacity is {}",
                    data.announcements.len(),
                    config.store.capacity
                )));
            }
        }
    }

    Ok(())
}
