//! Main downloader implementation

use crate::core::progress::TransferProgress;
use crate::core::transfer::{DownloadOutcome, TransferTarget};
use crate::download::engine::{DownloadEngine, EngineConfig};
use crate::error::VgetError;
use crate::resolver::{QualityPolicy, ResolvedDownload, Resolver};
use crate::utils::output_file_name;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Downloader configuration
#[derive(Clone)]
pub struct DownloadOptions {
    /// Quality selection policy
    pub quality: QualityPolicy,
    /// Output path (file or directory)
    pub output_path: Option<PathBuf>,
    /// HTTP timeout for short requests
    pub timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            quality: QualityPolicy::Exact("720p".to_string()),
            output_path: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Ties a resolver and the download engine into one run per video.
pub struct Downloader {
    resolver: Arc<dyn Resolver>,
    options: DownloadOptions,
    engine_config: EngineConfig,
    cancel: CancellationToken,
}

impl Downloader {
    /// Create a downloader around the given resolver
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            options: DownloadOptions::default(),
            engine_config: EngineConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set quality selection policy
    pub fn with_quality(mut self, quality: QualityPolicy) -> Self {
        self.options.quality = quality;
        self
    }

    /// Set output path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.output_path = Some(path.into());
        self
    }

    /// Set HTTP timeout for short requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self.engine_config.probe_timeout = timeout;
        self
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(TransferProgress) + Send + Sync + 'static,
    {
        self.engine_config.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Set the cancellation token shared with the engine
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve `video_url` and transfer the chosen rendition to disk.
    ///
    /// Resolution failures surface as errors; everything past resolution
    /// is reported through the outcome taxonomy.
    pub async fn run(&self, video_url: &str) -> Result<DownloadOutcome, VgetError> {
        let resolved = self
            .resolver
            .resolve(video_url, &self.options.quality)
            .await?;
        info!(
            "resolved '{}' [{}] ({} bytes advertised)",
            resolved.title,
            resolved.quality_label,
            resolved.size_hint.unwrap_or(0)
        );

        let output_path = self.determine_output_path(&resolved);
        debug!("output path: {}", output_path.display());

        let target = TransferTarget::new(resolved.url.clone(), output_path)
            .with_expected_size(resolved.size_hint);

        let engine = DownloadEngine::with_config(self.engine_config.clone())
            .with_cancellation(self.cancel.clone());
        Ok(engine.download(&target).await)
    }

    /// Apply the output naming policy: a directory gets the generated
    /// `{title}_{quality}.{ext}` name inside it, an explicit file path is
    /// used verbatim, and no path at all means the current directory.
    fn determine_output_path(&self, resolved: &ResolvedDownload) -> PathBuf {
        let file_name = output_file_name(
            &resolved.title,
            &resolved.quality_label,
            &resolved.extension,
        );
        match &self.options.output_path {
            Some(path) if path.is_dir() => path.join(file_name),
            Some(path) => path.clone(),
            None => PathBuf::from(file_name),
        }
    }
}
