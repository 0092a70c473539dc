//! Quota configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Bucket for interactive search traffic.
pub const SEARCH_BUCKET: &str = "search";
/// Bucket for the background popular listing.
pub const LISTING_BUCKET: &str = "listing";

/// Limit applied when a bucket has no usable configured limit.
pub const DEFAULT_LIMIT: u32 = 60;
/// Length of one quota window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Longest accepted window.
pub const MAX_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Per-bucket request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
    /// Shared fallback limit for unset or invalid bucket limits.
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    /// Requests per window keyed by bucket name.
    #[serde(default = "default_limits")]
    pub limits: HashMap<String, i64>,
}

fn default_window_secs() -> i64 {
    DEFAULT_WINDOW.as_secs() as i64
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT as i64
}

fn default_limits() -> HashMap<String, i64> {
    [
        (SEARCH_BUCKET.to_string(), 100),
        (LISTING_BUCKET.to_string(), 20),
    ]
    .into()
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            default_limit: default_limit(),
            limits: default_limits(),
        }
    }
}

impl QuotaConfig {
    /// Set the limit for one bucket.
    pub fn with_limit(mut self, bucket: impl Into<String>, limit: i64) -> Self {
        self.limits.insert(bucket.into(), limit);
        self
    }

    /// Set the window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        self
    }

    /// The shared default, itself falling back to [`DEFAULT_LIMIT`].
    pub fn effective_default(&self) -> u32 {
        positive(self.default_limit).unwrap_or(DEFAULT_LIMIT)
    }

    /// Limit for a bucket; missing, zero or negative values use the default.
    pub fn limit_for(&self, bucket: &str) -> u32 {
        self.limits
            .get(bucket)
            .and_then(|&limit| positive(limit))
            .unwrap_or_else(|| self.effective_default())
    }

    /// Window length; non-positive values use [`DEFAULT_WINDOW`] and
    /// anything longer than [`MAX_WINDOW`] is capped.
    pub fn window(&self) -> Duration {
        positive(self.window_secs)
            .map(|secs| Duration::from_secs(u64::from(secs)).min(MAX_WINDOW))
            .unwrap_or(DEFAULT_WINDOW)
    }
}

fn positive(value: i64) -> Option<u32> {
    if value > 0 {
        Some(value.min(u32::MAX as i64) as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_limits_use_default() {
        let config = QuotaConfig::default()
            .with_limit("zero", 0)
            .with_limit("negative", -5);

        assert_eq!(config.limit_for("zero"), DEFAULT_LIMIT);
        assert_eq!(config.limit_for("negative"), DEFAULT_LIMIT);
        assert_eq!(config.limit_for("unknown"), DEFAULT_LIMIT);
        assert_eq!(config.limit_for(SEARCH_BUCKET), 100);
    }

    #[test]
    fn test_invalid_default_limit_falls_back() {
        let config = QuotaConfig {
            default_limit: -1,
            ..Default::default()
        };
        assert_eq!(config.limit_for("unknown"), DEFAULT_LIMIT);
    }

    #[test]
    fn test_invalid_window_falls_back() {
        let config = QuotaConfig {
            window_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.window(), DEFAULT_WINDOW);
    }

    #[test]
    fn test_huge_window_is_capped() {
        let config = QuotaConfig {
            window_secs: i64::MAX,
            ..Default::default()
        };
        assert_eq!(config.window(), MAX_WINDOW);
    }
}
