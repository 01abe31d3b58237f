//! HTTP analysis service resolver

use crate::download::retry::{with_retry, Attempt, RetryPolicy};
use crate::error::VgetError;
use crate::resolver::{QualityOption, QualityPolicy, ResolvedDownload, Resolver};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Endpoints of the analysis/conversion service
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Endpoint that analyzes a video page and returns the options table
    pub analyze_url: String,
    /// Base URL the conversion job id is appended to for the link request
    pub link_base_url: String,
    /// Timeout for each service request
    pub timeout: Duration,
}

impl ResolverConfig {
    /// Create a config for the given service endpoints
    pub fn new(analyze_url: impl Into<String>, link_base_url: impl Into<String>) -> Self {
        Self {
            analyze_url: analyze_url.into(),
            link_base_url: link_base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    status: String,
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkResponse {
    status: String,
    #[serde(rename = "downloadUrlX")]
    download_url: Option<String>,
}

/// Resolver backed by the remote analysis/conversion service.
///
/// Analysis yields an HTML fragment listing the available renditions; the
/// link request then polls the conversion job for that rendition until the
/// service hands out a direct download URL.
pub struct ServiceResolver {
    client: reqwest::Client,
    config: ResolverConfig,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl ServiceResolver {
    /// Create a resolver for the configured service
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            retry: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the retry policy for service calls
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the cancellation token honored between attempts
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Ask the service to analyze a video page
    async fn analyze(&self, video_url: &str) -> Result<Attempt<String>, VgetError> {
        let response = self
            .client
            .post(&self.config.analyze_url)
            .timeout(self.config.timeout)
            .form(&[
                ("url", video_url),
                ("ajax", "1"),
                ("lang", "en"),
                ("platform", "youtube"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: AnalyzeResponse = response.json().await?;
        match (body.status.as_str(), body.result) {
            ("success", Some(result)) => Ok(Attempt::Ready(result)),
            ("success", None) => Ok(Attempt::Unrecognized(
                "success without result".to_string(),
            )),
            ("busy", _) => Ok(Attempt::Busy),
            (other, _) => Ok(Attempt::Unrecognized(other.to_string())),
        }
    }

    /// Ask the service for the direct download URL of one rendition
    async fn fetch_download_url(
        &self,
        option: &QualityOption,
    ) -> Result<Attempt<String>, VgetError> {
        let endpoint = format!("{}{}", self.config.link_base_url, option.id);
        let response = self
            .client
            .post(&endpoint)
            .timeout(self.config.timeout)
            .header("x-note", &option.note)
            .form(&[
                ("platform", "youtube"),
                ("url", option.video_url.as_str()),
                ("title", option.title.as_str()),
                ("id", option.id.as_str()),
                ("ext", option.ext.as_str()),
                ("note", option.note.as_str()),
                ("format", option.format.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: LinkResponse = response.json().await?;
        match (body.status.as_str(), body.download_url) {
            ("success", Some(url)) => Ok(Attempt::Ready(url)),
            ("success", None) => Ok(Attempt::Unrecognized(
                "success without downloadUrlX".to_string(),
            )),
            ("convert_ready", _) => Ok(Attempt::PendingConversion),
            ("busy", _) => Ok(Attempt::Busy),
            (other, _) => Ok(Attempt::Unrecognized(other.to_string())),
        }
    }
}

#[async_trait]
impl Resolver for ServiceResolver {
    async fn resolve(
        &self,
        video_url: &str,
        policy: &QualityPolicy,
    ) -> Result<ResolvedDownload, VgetError> {
        url::Url::parse(video_url)
            .map_err(|_| VgetError::InvalidUrl(video_url.to_string()))?;

        info!("analyzing {}", video_url);
        let html = with_retry(&self.retry, &self.cancel, |attempt| {
            debug!("analysis attempt {}/{}", attempt, self.retry.max_attempts);
            self.analyze(video_url)
        })
        .await
        .map_err(|e| match e {
            VgetError::RetriesExhausted(_) => VgetError::ResolutionFailed(
                "video analysis failed after maximum retries".to_string(),
            ),
            other => other,
        })?;

        let options = extract_options(&html)?;
        if options.is_empty() {
            return Err(VgetError::ResolutionFailed(
                "no download options found in analysis result".to_string(),
            ));
        }
        debug!("found {} quality options", options.len());

        let chosen = policy
            .select(&options)
            .ok_or(VgetError::NoQualityMatch)?
            .clone();
        info!("selected {} ({})", chosen.resolution, chosen.size_label);

        let url = with_retry(&self.retry, &self.cancel, |attempt| {
            info!(
                "requesting download URL, attempt {}/{}",
                attempt, self.retry.max_attempts
            );
            self.fetch_download_url(&chosen)
        })
        .await?;

        Ok(ResolvedDownload {
            url,
            title: chosen.title,
            extension: chosen.ext,
            quality_label: chosen.note,
            size_hint: (chosen.total_size > 0).then_some(chosen.total_size),
        })
    }
}

/// Pull the quality options out of the analysis HTML fragment.
///
/// Each table row carries the resolution and size columns plus a download
/// button whose onclick payload holds the seven fields the link request
/// needs.
fn extract_options(html: &str) -> Result<Vec<QualityOption>, VgetError> {
    let row_re = Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>")?;
    let cell_re = Regex::new(r"(?s)<td[^>]*>(.*?)</td>")?;
    let tag_re = Regex::new(r"<[^>]+>")?;
    let onclick_re = Regex::new(
        r"download\('([^']*)','([^']*)','([^']*)','([^']*)',(\d+),'([^']*)','([^']*)'\)",
    )?;

    let mut options = Vec::new();
    for row in row_re.captures_iter(html) {
        let row_html = &row[1];
        let cells: Vec<String> = cell_re
            .captures_iter(row_html)
            .map(|c| tag_re.replace_all(&c[1], "").trim().to_string())
            .collect();
        if cells.len() < 3 {
            continue;
        }
        let Some(caps) = onclick_re.captures(row_html) else {
            continue;
        };
        options.push(QualityOption {
            video_url: caps[1].to_string(),
            title: caps[2].to_string(),
            id: caps[3].to_string(),
            ext: caps[4].to_string(),
            total_size: caps[5].parse().unwrap_or(0),
            note: caps[6].to_string(),
            format: caps[7].to_string(),
            resolution: cells[0].clone(),
            size_label: cells[1].clone(),
        });
    }
    Ok(options)
}
