//! ValueEnum types for CLI arguments.

use clap::ValueEnum;

/// Output format for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored text summary
    #[default]
    Text,
    /// JSON summary on stdout
    Json,
}
