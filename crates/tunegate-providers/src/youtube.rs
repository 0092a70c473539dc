//! YouTube Data API v3 adapter (primary provider).

use crate::http::{build_client, fetch_json, non_empty};
use crate::provider::{PrimaryProvider, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use tunegate_core::duration::normalize_iso8601;
use tunegate_core::{CanonicalResult, PlaybackSource, SearchOrder};

/// YouTube "Music" video category.
const MUSIC_CATEGORY_ID: &str = "10";

/// YouTube client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Region for the most-popular chart.
    #[serde(default)]
    pub region_code: Option<String>,
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            region_code: None,
        }
    }
}

impl YouTubeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

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

/// YouTube Data API client.
pub struct YouTubeClient {
    config: YouTubeConfig,
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> Self {
        let client = build_client(config.timeout());
        Self { config, client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

// ============================================================================
// YouTube API payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: Option<String>,
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_title: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

// ============================================================================
// Normalization
// ============================================================================

fn normalize_search(response: SearchListResponse) -> Vec<CanonicalResult> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = non_empty(item.id.and_then(|id| id.video_id))?;
            Some(to_canonical(video_id, item.snippet, None))
        })
        .collect()
}

fn normalize_videos(response: VideoListResponse) -> Vec<CanonicalResult> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = non_empty(item.id)?;
            let duration = item.content_details.and_then(|d| d.duration);
            Some(to_canonical(video_id, item.snippet, duration.as_deref()))
        })
        .collect()
}

fn to_canonical(
    video_id: String,
    snippet: Option<Snippet>,
    duration: Option<&str>,
) -> CanonicalResult {
    let (title, channel, thumbnails) = match snippet {
        Some(snippet) => (
            snippet.title,
            snippet.channel_title,
            snippet.thumbnails.map(thumbnail_urls).unwrap_or_default(),
        ),
        None => (None, None, Vec::new()),
    };

    CanonicalResult::new(
        video_id,
        unescape_html(&title.unwrap_or_default()),
        unescape_html(&channel.unwrap_or_default()),
        PlaybackSource::Primary,
    )
    .with_thumbnails(thumbnails)
    .with_duration(normalize_iso8601(duration))
}

/// Largest first.
fn thumbnail_urls(thumbnails: Thumbnails) -> Vec<String> {
    [thumbnails.high, thumbnails.medium, thumbnails.default]
        .into_iter()
        .flatten()
        .filter_map(|t| non_empty(t.url))
        .collect()
}

/// Snippet text comes back HTML-escaped.
fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[async_trait]
impl PrimaryProvider for YouTubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn search(
        &self,
        query: &str,
        count: u32,
        order: SearchOrder,
    ) -> Result<Vec<CanonicalResult>, ProviderError> {
        debug!(query = %query, count, order = %order, "Searching YouTube");

        let max_results = count.to_string();
        let request = self
            .client
            .get(self.endpoint("search"))
            .timeout(self.config.timeout())
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", max_results.as_str()),
                ("order", order.as_str()),
                ("q", query),
                ("key", self.config.api_key.as_str()),
            ]);

        let response: SearchListResponse = fetch_json(request).await?;
        Ok(normalize_search(response))
    }

    async fn popular(&self, count: u32) -> Result<Vec<CanonicalResult>, ProviderError> {
        debug!(count, "Fetching YouTube most-popular chart");

        let max_results = count.to_string();
        let mut request = self
            .client
            .get(self.endpoint("videos"))
            .timeout(self.config.timeout())
            .query(&[
                ("part", "snippet,contentDetails"),
                ("chart", "mostPopular"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", max_results.as_str()),
                ("key", self.config.api_key.as_str()),
            ]);
        if let Some(ref region) = self.config.region_code {
            request = request.query(&[("regionCode", region.as_str())]);
        }

        let response: VideoListResponse = fetch_json(request).await?;
        Ok(normalize_videos(response))
    }
}
