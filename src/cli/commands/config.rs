//! Config management commands.
//!
//! ```bash
//! manifest-verify config init      # write defaults to the config path
//! manifest-verify config show      # print the effective config as TOML
//! manifest-verify config path      # print where the config lives
//! manifest-verify config validate  # report problems, exit 1 on errors
//! ```

use crate::cli::args::ConfigAction;
use crate::context::AppContext;
use manifest_verify::config::{validate, ConfigLoader, ValidationResult};
use manifest_verify::error::Result;
use manifest_verify::utils::MessageType;
use std::process::ExitCode;

/// Run the config command.
pub fn run_config(action: ConfigAction, ctx: AppContext) -> Result<ExitCode> {
    match action {
        ConfigAction::Init => {
            let path = ctx.require_config_path()?;
            ConfigLoader::init(&path)?;
            println!(
                "{}",
                MessageType::Success.format(&format!("Created {}", path.display()))
            );
        }
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&ctx.config)?);
        }
        ConfigAction::Path => {
            let path = ctx.require_config_path()?;
            println!("{}", path.display());
        }
        ConfigAction::Validate => {
            let result = validate(&ctx.config);
            print_validation(&result);
            if !result.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_validation(result: &ValidationResult) {
    for issue in &result.issues {
        eprintln!("{}", issue);
    }

    let errors = result.errors().count();
    let warnings = result.warnings().count();
    if errors == 0 {
        let msg = if warnings == 0 {
            "Config validation: OK".to_string()
        } else {
            format!(
                "Config validation: OK (with {} warning{})",
                warnings,
                if warnings == 1 { "" } else { "s" }
            )
        };
        println!("{}", MessageType::Success.format(&msg));
    } else {
        println!(
            "{}",
            MessageType::Error.format(&format!(
                "Config validation: FAILED - {} error{}, {} warning{}",
                errors,
                if errors == 1 { "" } else { "s" },
                warnings,
                if warnings == 1 { "" } else { "s" }
            ))
        );
    }
}
