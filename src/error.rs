//! Error types for vget

use thiserror::Error;

/// Main error type for vget operations
#[derive(Debug, Error)]
pub enum VgetError {
    #[error("size probe failed: {0}")]
    ProbeFailed(String),

    #[error("resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("no quality option matches the requested policy")]
    NoQualityMatch,

    #[error("download URL not found after {0} attempts")]
    RetriesExhausted(u32),

    #[error("interrupted")]
    Interrupted,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl VgetError {
    /// Check if the retry controller may run the operation again.
    ///
    /// Network-layer faults are worth another attempt; everything else is
    /// either a policy decision or a terminal condition.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VgetError::Http(_) | VgetError::Io(_))
    }
}
