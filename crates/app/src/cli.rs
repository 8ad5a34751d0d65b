//! CLI definitions for `capture`
//!
//! Kept separate from `main.rs` so the parsing rules can be unit tested.

use std::path::PathBuf;

use capture_domain::PageImageSize;
use clap::{Args, Parser, Subcommand};

/// Command line interface of the `capture` binary
#[derive(Debug, Parser)]
#[command(name = "capture")]
#[command(about = "Upload documents for analysis and review their extractions")]
#[command(
    long_about = "Upload documents to the document API, wait for the analysis and print the
extracted values. Sessions are created on demand: the first run registers an
anonymous user and stores its credentials in the system keyring.

QUICK START:
    capture analyze invoice.pdf                         Analyze a document
    capture feedback <id> --set amountToPay=13.50:EUR   Correct an extraction
    capture sign-out                                    Forget the stored user"
)]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON or TOML); environment variables win if set
    #[arg(long, global = true, env = "CAPTURE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keep credentials in memory only instead of the system keyring
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a document and print its extractions
    Analyze(AnalyzeArgs),

    /// Send corrected extractions for an analyzed document
    Feedback(FeedbackArgs),

    /// Download a rendered page of an uploaded document
    Page(PageArgs),

    /// Drop the session and delete the stored credentials
    SignOut,
}

/// Arguments of `capture analyze`
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Document to upload (PDF or image)
    pub file: PathBuf,

    /// Classification hint for the backend (e.g. invoice, remittance_slip)
    #[arg(long)]
    pub doc_type: Option<String>,

    /// Delete the document from the backend once the extractions are printed
    #[arg(long)]
    pub delete: bool,
}

/// Arguments of `capture feedback`
#[derive(Debug, Args)]
pub struct FeedbackArgs {
    /// Id of the analyzed document
    pub document_id: String,

    /// Corrected value as NAME=VALUE; may be repeated
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_correction)]
    pub corrections: Vec<(String, String)>,
}

/// Arguments of `capture page`
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Id of the uploaded document
    pub document_id: String,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rendering size as WIDTHxHEIGHT
    #[arg(long, default_value = "750x900", value_parser = parse_size)]
    pub size: PageImageSize,

    /// Where to write the JPEG
    #[arg(long, short)]
    pub out: PathBuf,
}

fn parse_correction(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

fn parse_size(raw: &str) -> Result<PageImageSize, String> {
    let invalid = || format!("expected WIDTHxHEIGHT, got `{raw}`");
    let (width, height) = raw.split_once('x').ok_or_else(invalid)?;
    let width = width.parse().map_err(|_| invalid())?;
    let height = height.parse().map_err(|_| invalid())?;
    Ok(PageImageSize::new(width, height))
}
