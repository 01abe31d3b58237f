//! Command line argument parsing

use crate::download::retry::RetryPolicy;
use crate::resolver::ResolverConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// vget - resumable video downloader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video page URL to download
    pub url: String,

    /// Quality selection (e.g. '720p', 'exact:720p', 'below:1080p', 'best')
    #[arg(short, long, value_name = "QUALITY", default_value = "exact:720p")]
    pub quality: String,

    /// Output path (file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Analysis service endpoint
    #[arg(long, value_name = "URL", env = "VGET_ANALYZE_URL")]
    pub analyze_url: String,

    /// Download link service base URL (job id is appended)
    #[arg(long, value_name = "URL", env = "VGET_LINK_URL")]
    pub link_url: String,

    /// Maximum attempts when requesting the download URL
    #[arg(long, default_value = "5")]
    pub max_retries: u32,

    /// Wait between retry attempts (e.g. 10s)
    #[arg(long, value_name = "DURATION", default_value = "10s")]
    pub wait_time: humantime::Duration,

    /// Wait while a server-side conversion completes (e.g. 20s)
    #[arg(long, value_name = "DURATION", default_value = "20s")]
    pub conversion_wait: humantime::Duration,

    /// HTTP timeout (e.g. 30s, 1m)
    #[arg(long, value_name = "DURATION", default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Disable progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short = 'Q', long)]
    pub quiet: bool,
}

impl Args {
    /// Get HTTP timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Build the retry policy for service calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            inter_attempt_delay: self.wait_time.into(),
            conversion_pending_delay: self.conversion_wait.into(),
        }
    }

    /// Build the resolver endpoint configuration
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new(self.analyze_url.clone(), self.link_url.clone())
            .with_timeout(self.timeout_duration())
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "vget",
            "https://example.com/watch?v=abc",
            "--analyze-url",
            "https://svc.example.com/analyze",
            "--link-url",
            "https://svc.example.com/link/",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.quality, "exact:720p");
        assert_eq!(args.output, None);
        assert_eq!(args.max_retries, 5);
        assert!(!args.no_progress);
        assert_eq!(args.verbosity_level(), VerbosityLevel::Normal);
    }

    #[test]
    fn test_retry_policy_mapping() {
        let args = parse(&["--max-retries", "3", "--wait-time", "2s", "--conversion-wait", "4s"]);
        let policy = args.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.inter_attempt_delay, Duration::from_secs(2));
        assert_eq!(policy.conversion_pending_delay, Duration::from_secs(4));
    }

    #[test]
    fn test_resolver_config_mapping() {
        let args = parse(&["--timeout", "10s"]);
        let config = args.resolver_config();
        assert_eq!(config.analyze_url, "https://svc.example.com/analyze");
        assert_eq!(config.link_base_url, "https://svc.example.com/link/");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["--verbose"]).verbosity_level(), VerbosityLevel::Verbose);
        assert_eq!(parse(&["--quiet"]).verbosity_level(), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_missing_url_is_an_error() {
        let result = Args::try_parse_from(["vget"]);
        assert!(result.is_err());
    }
}
