//! Video reference resolution

pub mod selection;
pub mod service;

pub use selection::QualityPolicy;
pub use service::{ResolverConfig, ServiceResolver};

use crate::error::VgetError;
use async_trait::async_trait;

/// A concrete download resolved from a video reference
#[derive(Debug, Clone)]
pub struct ResolvedDownload {
    /// Direct byte-stream URL
    pub url: String,
    /// Video title, unsanitized
    pub title: String,
    /// Container extension (e.g. "mp4")
    pub extension: String,
    /// Quality label (e.g. "720p")
    pub quality_label: String,
    /// Size the service advertised, if any
    pub size_hint: Option<u64>,
}

/// One downloadable rendition offered by the analysis service
#[derive(Debug, Clone)]
pub struct QualityOption {
    /// Original video page URL
    pub video_url: String,
    /// Video title
    pub title: String,
    /// Service-side conversion job id
    pub id: String,
    /// Container extension
    pub ext: String,
    /// Advertised size in bytes (0 when unknown)
    pub total_size: u64,
    /// Quality note used as the rendition label
    pub note: String,
    /// Service format code
    pub format: String,
    /// Resolution column text from the options table
    pub resolution: String,
    /// Size column text from the options table
    pub size_label: String,
}

/// Turns a video reference and a quality policy into a concrete download.
///
/// Implementations may take observable time: the service behind them can
/// poll a conversion job before a URL becomes available.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(
        &self,
        video_url: &str,
        policy: &QualityPolicy,
    ) -> Result<ResolvedDownload, VgetError>;
}
