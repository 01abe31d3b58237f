//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::progress::{format_bytes, TransferProgress};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Output formatter for vget
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Mutex::new(None),
        }
    }

    /// Update the progress bar, creating it on the first report
    pub fn update_progress(&self, progress: &TransferProgress) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        let mut guard = match self.progress_bar.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        let bar = guard.get_or_insert_with(|| {
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            let bar = ProgressBar::new(progress.total_size);
            bar.set_style(style);
            bar
        });

        bar.set_position(progress.transferred);
        if progress.total_size > 0 {
            bar.set_length(progress.total_size);
        }
        bar.set_message(progress.speed_string());
    }

    /// Finish the progress bar if one was started
    pub fn finish_progress(&self, message: &str) {
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(bar) = guard.as_ref() {
                bar.finish_with_message(message.to_string());
            }
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("{}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("{}", message.green());
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("{}", message.yellow());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("{}", message.red());
    }

    /// Print download completion with elapsed time
    pub fn print_download_complete(&self, path: &str, bytes: u64, elapsed: Duration) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        self.success(&format!(
            "Saved {} ({}) in {}",
            path,
            format_bytes(bytes),
            crate::core::progress::format_duration(elapsed)
        ));
    }
}
