// Binary-specific modules
mod cli;
mod context;

use cli::{parse_cli, Commands};
use context::AppContext;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = parse_cli();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = AppContext::new(cli.config.clone())?;

    let code = match cli.command {
        Commands::Verify(args) => cli::commands::run_verify(args, ctx).await?,
        Commands::Config(args) => cli::commands::run_config(args.action, ctx)?,
    };

    Ok(code)
}
