//! The `verify` command: check every manifest row against the object store.

use crate::cli::args::{OutputFormat, VerifyArgs};
use crate::context::AppContext;
use indicatif::{ProgressBar, ProgressStyle};
use manifest_verify::config::validate;
use manifest_verify::dispatch::{Dispatcher, RunEvent};
use manifest_verify::error::{ManifestVerifyError, Result};
use manifest_verify::manifest::ManifestLoader;
use manifest_verify::report::{collect, event_line};
use manifest_verify::storage::{self, ObjectLocation};
use manifest_verify::utils::MessageType;
use manifest_verify::validation::{ChecksumVerifier, VerifyOutcome};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;

/// Where a line for one event goes.
enum Sink {
    Stdout,
    Stderr,
}

/// Match and mismatch lines go to stdout, except in JSON mode where stdout
/// carries only the summary.
fn sink_for(event: &RunEvent, output: OutputFormat) -> Sink {
    match event {
        RunEvent::Verified(report) => match report.outcome {
            VerifyOutcome::Unverifiable { .. } => Sink::Stderr,
            _ if output == OutputFormat::Json => Sink::Stderr,
            _ => Sink::Stdout,
        },
        RunEvent::Malformed(_) => Sink::Stderr,
    }
}

/// Run the verify command.
pub async fn run_verify(args: VerifyArgs, ctx: AppContext) -> Result<ExitCode> {
    let ctx = ctx.with_verify_overrides(&args);
    let config = &ctx.config;

    let validation = validate(config);
    for issue in validation.warnings() {
        tracing::warn!("{}", issue);
    }
    if let Some(issue) = validation.errors().next() {
        return Err(ManifestVerifyError::Config(issue.to_string()));
    }
    let timeout = config.verify.timeout_duration()?;

    let store = storage::connect(&config.storage).await?;

    let location = ObjectLocation::new(args.bucket.as_str(), &args.manifest)?;
    let manifest = ManifestLoader::new(store.clone(), config.manifest.clone())
        .load(&location)
        .await?;

    let verifier = ChecksumVerifier::new(store)
        .with_chunk_size(config.verify.chunk_size)
        .with_timeout(timeout);
    let dispatcher = Dispatcher::new(Arc::new(verifier), config.verify.workers);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight objects");
            let _ = shutdown_tx.send(true);
        }
    });

    let pb = if args.progress {
        let pb = ProgressBar::new(manifest.row_count() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let events = dispatcher.spawn(manifest.into_rows(), shutdown_rx.clone());
    let mut summary = collect(location.to_string(), events, |event| {
        let hide = args.errors_only && !event.is_failure();
        if !hide {
            let line = event_line(event);
            match (&pb, sink_for(event, args.output)) {
                (Some(pb), _) => pb.println(line),
                (None, Sink::Stdout) => println!("{}", line),
                (None, Sink::Stderr) => eprintln!("{}", line),
            }
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })
    .await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    summary.interrupted = *shutdown_rx.borrow();

    match args.output {
        OutputFormat::Text => {
            eprintln!();
            eprint!("{}", summary.render_text());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    if summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        if summary.interrupted {
            eprintln!("{}", MessageType::Warning.format("Verification was interrupted"));
        }
        Ok(ExitCode::FAILURE)
    }
}
