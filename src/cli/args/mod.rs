//! CLI argument definitions and subcommands.
//!
//! - [`enums`]: ValueEnum types
//! - [`global`]: top-level parser and STYLES constant
//! - [`commands`]: per-command argument structs

mod commands;
mod enums;
mod global;

pub use commands::{ConfigAction, ConfigArgs, VerifyArgs};
pub use enums::OutputFormat;
pub use global::{parse_cli, Cli, Commands, STYLES};
