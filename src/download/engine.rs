//! Resumable single-stream download engine

use crate::core::progress::TransferProgress;
use crate::core::transfer::{DownloadOutcome, TransferState, TransferTarget};
use crate::error::VgetError;
use futures_util::StreamExt;
use reqwest::header;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Download engine configuration
#[derive(Clone)]
pub struct EngineConfig {
    /// Timeout for the size probe request
    pub probe_timeout: Duration,
    /// Progress callback, invoked after every chunk write
    pub progress_callback: Option<Arc<dyn Fn(TransferProgress) + Send + Sync>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(30),
            progress_callback: None,
        }
    }
}

/// Resumable downloader for a single URL-to-file transfer.
///
/// Repeated invocations against the same target are idempotent: a crashed
/// or interrupted run leaves its partial bytes on disk and the next run
/// resumes from that offset.
pub struct DownloadEngine {
    client: reqwest::Client,
    config: EngineConfig,
    cancel: CancellationToken,
}

impl DownloadEngine {
    /// Create a new engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new engine with configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Set progress callback
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(TransferProgress) + Send + Sync + 'static,
    {
        self.config.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Set the cancellation token polled between chunk writes
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Set the size probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Transfer `target.url` to `target.local_path`, resuming any partial
    /// file found there. Every failure mode folds into the outcome
    /// taxonomy; partial bytes are never discarded except on an
    /// unconfirmed range reply.
    pub async fn download(&self, target: &TransferTarget) -> DownloadOutcome {
        match self.run(target).await {
            Ok(outcome) => outcome,
            Err(VgetError::Interrupted) => DownloadOutcome::Interrupted,
            Err(e) => DownloadOutcome::TransferFailed(e),
        }
    }

    async fn run(&self, target: &TransferTarget) -> Result<DownloadOutcome, VgetError> {
        let total_size = match self.probe_size(&target.url).await? {
            0 => target.expected_size.unwrap_or(0),
            n => n,
        };
        debug!("server-reported size: {} bytes", total_size);

        let state = self.inspect_local(target, total_size).await;
        if state.is_complete() {
            info!(
                "{} already has {} of {} bytes, skipping transfer",
                target.local_path.display(),
                state.bytes_on_disk,
                state.total_size
            );
            return Ok(DownloadOutcome::AlreadyComplete {
                path: target.local_path.clone(),
                bytes: state.bytes_on_disk,
            });
        }

        self.transfer(target, state).await
    }

    /// HEAD probe for the authoritative total size
    async fn probe_size(&self, url: &str) -> Result<u64, VgetError> {
        let response = self
            .client
            .head(url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| VgetError::ProbeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VgetError::ProbeFailed(format!(
                "status {}",
                response.status()
            )));
        }

        Ok(response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    async fn inspect_local(&self, target: &TransferTarget, total_size: u64) -> TransferState {
        let bytes_on_disk = match tokio::fs::metadata(&target.local_path).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };
        TransferState {
            bytes_on_disk,
            total_size,
            resumable: bytes_on_disk > 0,
        }
    }

    async fn transfer(
        &self,
        target: &TransferTarget,
        mut state: TransferState,
    ) -> Result<DownloadOutcome, VgetError> {
        let mut request = self.client.get(&target.url);
        if state.resumable {
            info!("resuming from offset {}", state.bytes_on_disk);
            request = request.header(
                header::RANGE,
                format!("bytes={}-", state.bytes_on_disk),
            );
        }
        let response = request.send().await?.error_for_status()?;

        // A reply without Content-Range means the server ignored the range
        // request and is sending the whole body; the existing partial copy
        // cannot be safely appended to.
        if state.resumable && response.headers().get(header::CONTENT_RANGE).is_none() {
            warn!("server did not honor the range request, restarting from zero");
            tokio::fs::remove_file(&target.local_path).await?;
            state.bytes_on_disk = 0;
            state.resumable = false;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target.local_path)
            .await?;

        let mut progress = TransferProgress::new(state.total_size, state.bytes_on_disk);
        let mut transferred = state.bytes_on_disk;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            if self.cancel.is_cancelled() {
                file.flush().await?;
                info!("transfer interrupted at {} bytes", transferred);
                return Ok(DownloadOutcome::Interrupted);
            }

            let chunk = chunk?;
            file.write_all(&chunk).await?;
            transferred += chunk.len() as u64;

            progress.update(transferred);
            if let Some(callback) = &self.config.progress_callback {
                callback(progress.clone());
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let actual = tokio::fs::metadata(&target.local_path).await?.len();
        if state.total_size > 0 && actual != state.total_size {
            warn!(
                "size mismatch for {}: expected {}, got {}",
                target.local_path.display(),
                state.total_size,
                actual
            );
            return Ok(DownloadOutcome::SizeMismatch {
                expected: state.total_size,
                actual,
            });
        }

        info!("download completed: {} bytes", actual);
        Ok(DownloadOutcome::Completed {
            path: target.local_path.clone(),
            bytes: actual,
        })
    }
}

impl Default for DownloadEngine {
    fn default() -> Self {
        Self::new()
    }
}
