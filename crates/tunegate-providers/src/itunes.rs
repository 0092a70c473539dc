//! iTunes Search API adapter (secondary provider).

use crate::http::{build_client, fetch_json, non_empty};
use crate::provider::{ProviderError, SecondaryProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use tunegate_core::duration::from_millis;
use tunegate_core::{CanonicalResult, PlaybackSource};

/// iTunes client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItunesConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Storefront country code.
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_enabled() -> bool {
    true
}

fn default_base_url() -> String {
    "https://itunes.apple.com".to_string()
}

fn default_timeout_ms() -> u64 {
    4000
}

fn default_country() -> String {
    "US".to_string()
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            country: default_country(),
        }
    }
}

impl ItunesConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

pub struct ItunesClient {
    config: ItunesConfig,
    client: reqwest::Client,
}

impl ItunesClient {
    pub fn new(config: ItunesConfig) -> Self {
        let client = build_client(config.timeout());
        Self { config, client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Track>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Track {
    track_id: Option<u64>,
    track_name: Option<String>,
    artist_name: Option<String>,
    track_time_millis: Option<u64>,
    preview_url: Option<String>,
    artwork_url100: Option<String>,
    artwork_url60: Option<String>,
}

fn normalize(response: SearchResponse) -> Vec<CanonicalResult> {
    response
        .results
        .into_iter()
        .filter_map(|track| {
            let id = track.track_id?;
            let thumbnails = [track.artwork_url100, track.artwork_url60]
                .into_iter()
                .filter_map(non_empty)
                .collect();

            Some(
                CanonicalResult::new(
                    format!("itunes:{}", id),
                    track.track_name.unwrap_or_default(),
                    track.artist_name.unwrap_or_default(),
                    PlaybackSource::Secondary,
                )
                .with_thumbnails(thumbnails)
                .with_duration(from_millis(track.track_time_millis))
                .with_preview(non_empty(track.preview_url)),
            )
        })
        .collect()
}

#[async_trait]
impl SecondaryProvider for ItunesClient {
    fn name(&self) -> &str {
        "itunes"
    }

    async fn search(&self, query: &str, count: u32) -> Result<Vec<CanonicalResult>, ProviderError> {
        debug!(query = %query, count, "Searching iTunes");

        let limit = count.to_string();
        let request = self
            .client
            .get(format!("{}/search", self.config.base_url.trim_end_matches('/')))
            .timeout(self.config.timeout())
            .query(&[
                ("term", query),
                ("media", "music"),
                ("entity", "song"),
                ("limit", limit.as_str()),
                ("country", self.config.country.as_str()),
            ]);

        let response: SearchResponse = fetch_json(request).await?;
        Ok(normalize(response))
    }
}
