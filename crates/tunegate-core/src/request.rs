//! Inbound search requests and the response envelope.

use crate::error::{Error, Result};
use crate::result::CanonicalResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 25;
pub const DEFAULT_RESULTS: u32 = 12;

/// Sort order forwarded to the primary provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Date,
    Rating,
    ViewCount,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
            SearchOrder::Rating => "rating",
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relevance" => Ok(SearchOrder::Relevance),
            "date" => Ok(SearchOrder::Date),
            "rating" => Ok(SearchOrder::Rating),
            "viewCount" => Ok(SearchOrder::ViewCount),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {}", other))),
        }
    }
}

/// A search as received from a client, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    pub order: SearchOrder,
}

impl SearchRequest {
    /// Build a request, clamping `max_results` into `1..=25` (default 12).
    pub fn new(query: impl Into<String>, max_results: Option<i64>, order: SearchOrder) -> Self {
        Self {
            query: query.into(),
            max_results: clamp_results(max_results),
            order,
        }
    }
}

/// Clamp a requested result count into the supported range.
pub fn clamp_results(requested: Option<i64>) -> u32 {
    match requested {
        None => DEFAULT_RESULTS,
        Some(n) => n.clamp(MIN_RESULTS as i64, MAX_RESULTS as i64) as u32,
    }
}

/// Which tier produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Primary,
    Cache,
    StaleCache,
    Secondary,
    Placeholder,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Primary => "primary",
            Origin::Cache => "cache",
            Origin::StaleCache => "stale-cache",
            Origin::Secondary => "secondary",
            Origin::Placeholder => "placeholder",
        }
    }

    /// Whether the answer came from a fallback tier.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Origin::StaleCache | Origin::Secondary | Origin::Placeholder
        )
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the primary provider was bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    #[serde(rename = "youtube_quota_exceeded")]
    QuotaExceeded,
    #[serde(rename = "youtube_error")]
    PrimaryError,
    #[serde(rename = "all_sources_failed")]
    AllSourcesFailed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::QuotaExceeded => "youtube_quota_exceeded",
            FallbackReason::PrimaryError => "youtube_error",
            FallbackReason::AllSourcesFailed => "all_sources_failed",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remaining provider budget reported alongside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaInfo {
    pub remaining: u32,
    pub limit: u32,
    /// Seconds until the current window resets.
    pub window_reset_in: u64,
}

/// Results of one request, owned by that request until cached or returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub results: Vec<CanonicalResult>,
    pub origin: Origin,
    pub fallback_reason: Option<FallbackReason>,
    /// Name of the concrete provider or tier that answered.
    pub source: String,
}

impl FetchOutcome {
    pub fn new(results: Vec<CanonicalResult>, origin: Origin, source: impl Into<String>) -> Self {
        Self {
            results,
            origin,
            fallback_reason: None,
            source: source.into(),
        }
    }

    pub fn with_reason(mut self, reason: FallbackReason) -> Self {
        self.fallback_reason = Some(reason);
        self
    }

    pub fn into_response(self, quota: Option<QuotaInfo>) -> SearchResponse {
        SearchResponse {
            fallback: self.origin.is_degraded(),
            items: self.results,
            origin: self.origin,
            source: Some(self.source),
            fallback_reason: self.fallback_reason,
            quota,
        }
    }
}

/// Response envelope shared by search and popular listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<CanonicalResult>,
    pub origin: Origin,
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::PlaybackSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clamp_results() {
        assert_eq!(clamp_results(None), 12);
        assert_eq!(clamp_results(Some(0)), 1);
        assert_eq!(clamp_results(Some(-4)), 1);
        assert_eq!(clamp_results(Some(5)), 5);
        assert_eq!(clamp_results(Some(500)), 25);
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!("viewCount".parse::<SearchOrder>().unwrap(), SearchOrder::ViewCount);
        assert_eq!("date".parse::<SearchOrder>().unwrap(), SearchOrder::Date);
        assert!("views".parse::<SearchOrder>().is_err());
        assert_eq!(SearchOrder::default(), SearchOrder::Relevance);
    }

    #[test]
    fn test_envelope_serialization() {
        let outcome = FetchOutcome::new(
            vec![CanonicalResult::new("itunes:1", "Song", "Artist", PlaybackSource::Secondary)],
            Origin::Secondary,
            "itunes",
        )
        .with_reason(FallbackReason::QuotaExceeded);

        let response = outcome.into_response(Some(QuotaInfo {
            remaining: 0,
            limit: 100,
            window_reset_in: 42,
        }));
        let json = serde_json::to_value(&response).expect("serialize");

        assert_eq!(json["origin"], "secondary");
        assert_eq!(json["fallback"], true);
        assert_eq!(json["source"], "itunes");
        assert_eq!(json["fallbackReason"], "youtube_quota_exceeded");
        assert_eq!(json["quota"]["windowResetIn"], 42);
        assert_eq!(json["items"][0]["playbackSource"], "secondary");
    }

    #[test]
    fn test_fresh_envelope_omits_reason() {
        let response = FetchOutcome::new(vec![], Origin::Primary, "youtube").into_response(None);
        let json = serde_json::to_value(&response).expect("serialize");

        assert_eq!(json["fallback"], false);
        assert!(json.get("fallbackReason").is_none());
        assert!(json.get("quota").is_none());
    }
}
