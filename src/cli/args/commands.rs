//! Argument structs for individual commands.

use super::enums::OutputFormat;
use clap::{Parser, Subcommand};
use manifest_verify::config::Backend;
use manifest_verify::manifest::ColumnRef;

#[derive(Parser, Clone, Debug)]
pub struct VerifyArgs {
    /// Bucket holding the manifest
    #[arg(short, long, env = "MANIFEST_VERIFY_BUCKET")]
    pub bucket: String,

    /// Key of the manifest within the bucket
    #[arg(short, long, env = "MANIFEST_VERIFY_MANIFEST")]
    pub manifest: String,

    /// Number of concurrent verifications
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Per-object time limit (e.g. "30s", "10m")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Bytes per hash update
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Object store backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Custom endpoint URL (required for the http backend)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Region override for the s3 backend
    #[arg(long)]
    pub region: Option<String>,

    /// Checksum column: 0-based index or header name
    #[arg(long)]
    pub checksum_column: Option<ColumnRef>,

    /// Object URI column: 0-based index or header name
    #[arg(long)]
    pub uri_column: Option<ColumnRef>,

    /// Treat the first manifest row as a header
    #[arg(long)]
    pub header: bool,

    /// Summary output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Show a progress bar
    #[arg(short, long)]
    pub progress: bool,

    /// Only print objects that did not match
    #[arg(long)]
    pub errors_only: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init,
    /// Show the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Check the configuration file for problems
    Validate,
}
