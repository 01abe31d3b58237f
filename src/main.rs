//! Main entry point for vget CLI
//!
//! Exit codes:
//! - 0: download completed
//! - 1: interrupted by the user
//! - 2: file size mismatch
//! - 3: transfer failed
//! - 4: download URL not found (retries exhausted)
//! - 5: resolution failed
//! - 6: file already complete

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vget::cli::{Args, OutputFormatter};
use vget::{DownloadOutcome, Downloader, QualityPolicy, ServiceResolver, VgetError};

mod exit {
    pub const COMPLETED: i32 = 0;
    pub const INTERRUPTED: i32 = 1;
    pub const SIZE_MISMATCH: i32 = 2;
    pub const TRANSFER_FAILED: i32 = 3;
    pub const URL_NOT_FOUND: i32 = 4;
    pub const RESOLUTION_FAILED: i32 = 5;
    pub const ALREADY_COMPLETE: i32 = 6;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args = Args::parse();
    info!("starting vget for {}", args.url);

    let formatter = Arc::new(OutputFormatter::new(args.verbosity_level()));

    let quality = match QualityPolicy::parse(&args.quality) {
        Ok(policy) => policy,
        Err(e) => {
            formatter.error(&format!("Invalid quality selector: {}", e));
            std::process::exit(exit::RESOLUTION_FAILED);
        }
    };

    // Ctrl+C flips the shared token; every long-running step polls it.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let resolver = Arc::new(
        ServiceResolver::new(args.resolver_config())
            .with_retry_policy(args.retry_policy())
            .with_cancellation(cancel.clone()),
    );

    let mut downloader = Downloader::new(resolver)
        .with_quality(quality)
        .with_timeout(args.timeout_duration())
        .with_cancellation(cancel.clone());

    if let Some(output) = &args.output {
        downloader = downloader.with_output_path(output);
    }
    if !args.no_progress {
        let formatter = formatter.clone();
        downloader = downloader.with_progress(move |progress| {
            formatter.update_progress(&progress);
        });
    }

    let start = Instant::now();
    let code = match downloader.run(&args.url).await {
        Ok(outcome) => report_outcome(&formatter, outcome, start),
        Err(e) => report_error(&formatter, e),
    };
    std::process::exit(code)
}

/// Map a terminal outcome to its message and exit code
fn report_outcome(formatter: &OutputFormatter, outcome: DownloadOutcome, start: Instant) -> i32 {
    match outcome {
        DownloadOutcome::Completed { path, bytes } => {
            formatter.finish_progress("done");
            formatter.print_download_complete(&path.display().to_string(), bytes, start.elapsed());
            exit::COMPLETED
        }
        DownloadOutcome::AlreadyComplete { path, bytes } => {
            formatter.info(&format!(
                "{} already complete ({} bytes), nothing to do",
                path.display(),
                bytes
            ));
            exit::ALREADY_COMPLETE
        }
        DownloadOutcome::SizeMismatch { expected, actual } => {
            formatter.finish_progress("size mismatch");
            formatter.error(&format!(
                "File size mismatch: expected {} bytes, got {}",
                expected, actual
            ));
            exit::SIZE_MISMATCH
        }
        DownloadOutcome::TransferFailed(cause) => {
            formatter.finish_progress("failed");
            formatter.error(&format!("Download failed: {}", cause));
            exit::TRANSFER_FAILED
        }
        DownloadOutcome::Interrupted => {
            formatter.finish_progress("interrupted");
            formatter.warning("Interrupted; partial file kept for resume");
            exit::INTERRUPTED
        }
    }
}

/// Map a resolution-phase error to its message and exit code
fn report_error(formatter: &OutputFormatter, error: VgetError) -> i32 {
    match error {
        VgetError::RetriesExhausted(attempts) => {
            formatter.error(&format!(
                "Download URL not found after {} attempts",
                attempts
            ));
            exit::URL_NOT_FOUND
        }
        VgetError::Interrupted => {
            formatter.warning("Interrupted");
            exit::INTERRUPTED
        }
        other => {
            formatter.error(&format!("Resolution failed: {}", other));
            exit::RESOLUTION_FAILED
        }
    }
}

/// Initialize logging system
fn init_logging() -> anyhow::Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("failed to initialize logging")?;

    Ok(())
}
