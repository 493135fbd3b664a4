//! Global CLI structures.

use clap::builder::styling::{AnsiColor, Effects};
use clap::builder::Styles;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{ConfigArgs, VerifyArgs};

// Colored help menu
pub const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(name = "manifest-verify")]
#[command(about = "Verify S3 objects against an MD5 manifest")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (default: platform config dir)
    #[arg(long, global = true, env = "MANIFEST_VERIFY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify every object listed in a manifest
    Verify(VerifyArgs),
    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Parse CLI with colored styles
pub fn parse_cli() -> Cli {
    let cmd = Cli::command().styles(STYLES).color(clap::ColorChoice::Auto);
    let matches = cmd.get_matches();
    match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
