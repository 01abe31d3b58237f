//! # vget - Resumable Video Downloader
//!
//! Resolves a video page reference into a concrete, resumable file
//! download.
//!
//! ## Features
//!
//! - Range-based resume of partial downloads
//! - Restart fallback for servers without partial-content support
//! - Post-transfer size verification
//! - Bounded retry with transient-condition classification
//! - Cooperative cancellation
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vget::{Downloader, QualityPolicy, ResolverConfig, ServiceResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Arc::new(ServiceResolver::new(ResolverConfig::new(
//!         "https://service.example.com/analyze",
//!         "https://service.example.com/link/",
//!     )));
//!     let downloader = Downloader::new(resolver)
//!         .with_quality(QualityPolicy::Exact("720p".to_string()))
//!         .with_output_path("./downloads");
//!
//!     let outcome = downloader.run("https://example.com/watch?v=abc").await?;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod download;
pub mod error;
pub mod resolver;
pub mod utils;

// Re-export main types
pub use crate::core::{
    DownloadOptions, DownloadOutcome, Downloader, TransferProgress, TransferState, TransferTarget,
};
pub use crate::download::{with_retry, Attempt, DownloadEngine, EngineConfig, RetryPolicy};
pub use crate::error::VgetError;
pub use crate::resolver::{
    QualityOption, QualityPolicy, ResolvedDownload, Resolver, ResolverConfig, ServiceResolver,
};

/// Result type alias for vget operations
pub type Result<T> = std::result::Result<T, VgetError>;
