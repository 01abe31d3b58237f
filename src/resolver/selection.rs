//! Quality selection policy

use crate::resolver::QualityOption;
use regex::Regex;

/// Strategy for picking one quality option out of the set a video offers.
///
/// Replaces the interactive resolution prompt of older tools with an
/// explicit, headless policy supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum QualityPolicy {
    /// The option whose resolution label contains the given text
    Exact(String),
    /// The highest resolution at or below the given label
    NearestBelow(String),
    /// The lowest resolution at or above the given label
    NearestAbove(String),
    /// The highest resolution available
    Best,
    /// The lowest resolution available
    Worst,
}

impl QualityPolicy {
    /// Parse a policy from a CLI string.
    ///
    /// Accepts `best`, `worst`, `exact:720p`, `below:1080p`, `above:480p`,
    /// and a bare label like `720p` (treated as exact).
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "best" => return Ok(QualityPolicy::Best),
            "worst" => return Ok(QualityPolicy::Worst),
            _ => {}
        }

        if let Some(label) = s.strip_prefix("exact:") {
            return Ok(QualityPolicy::Exact(label.to_string()));
        }
        if let Some(label) = s.strip_prefix("below:") {
            return Ok(QualityPolicy::NearestBelow(label.to_string()));
        }
        if let Some(label) = s.strip_prefix("above:") {
            return Ok(QualityPolicy::NearestAbove(label.to_string()));
        }
        if s.is_empty() {
            return Err("empty quality selector".to_string());
        }
        Ok(QualityPolicy::Exact(s.to_string()))
    }

    /// Apply the policy to the available options. `None` means nothing
    /// matched and resolution must fail rather than guess.
    pub fn select<'a>(&self, options: &'a [QualityOption]) -> Option<&'a QualityOption> {
        match self {
            QualityPolicy::Exact(label) => options
                .iter()
                .find(|o| o.resolution.contains(label.as_str())),
            QualityPolicy::NearestBelow(label) => {
                let limit = resolution_rank(label)?;
                options
                    .iter()
                    .filter(|o| resolution_rank(&o.resolution).is_some_and(|r| r <= limit))
                    .max_by_key(|o| resolution_rank(&o.resolution))
            }
            QualityPolicy::NearestAbove(label) => {
                let floor = resolution_rank(label)?;
                options
                    .iter()
                    .filter(|o| resolution_rank(&o.resolution).is_some_and(|r| r >= floor))
                    .min_by_key(|o| resolution_rank(&o.resolution))
            }
            QualityPolicy::Best => options.iter().max_by_key(|o| resolution_rank(&o.resolution)),
            QualityPolicy::Worst => options.iter().min_by_key(|o| resolution_rank(&o.resolution)),
        }
    }
}

/// Vertical resolution parsed from a label like "720p" or "1080p60"
fn resolution_rank(label: &str) -> Option<u32> {
    let re = Regex::new(r"(\d+)\s*[pP]").ok()?;
    re.captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
