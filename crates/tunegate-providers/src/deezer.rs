//! Deezer public search adapter (secondary provider).

use crate::http::{build_client, fetch_json, non_empty};
use crate::provider::{ProviderError, SecondaryProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use tunegate_core::{CanonicalResult, PlaybackSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeezerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://api.deezer.com".to_string()
}

fn default_timeout_ms() -> u64 {
    4000
}

impl Default for DeezerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DeezerConfig {
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

pub struct DeezerClient {
    config: DeezerConfig,
    client: reqwest::Client,
}

impl DeezerClient {
    pub fn new(config: DeezerConfig) -> Self {
        let client = build_client(config.timeout());
        Self { config, client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Track>,
    /// Deezer reports failures inside a 200 response.
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
    code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: Option<u64>,
    title: Option<String>,
    duration: Option<u64>,
    preview: Option<String>,
    artist: Option<Artist>,
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Album {
    cover_medium: Option<String>,
    cover_small: Option<String>,
}

fn normalize(response: SearchResponse) -> Result<Vec<CanonicalResult>, ProviderError> {
    if let Some(error) = response.error {
        return Err(ProviderError::Response {
            status: 200,
            body: format!(
                "{} (code {}): {}",
                error.kind.unwrap_or_else(|| "Exception".to_string()),
                error.code.unwrap_or_default(),
                error.message.unwrap_or_default()
            ),
        });
    }

    Ok(response
        .data
        .into_iter()
        .filter_map(|track| {
            let id = track.id?;
            let thumbnails = track
                .album
                .map(|album| {
                    [album.cover_medium, album.cover_small]
                        .into_iter()
                        .filter_map(non_empty)
                        .collect()
                })
                .unwrap_or_default();

            Some(
                CanonicalResult::new(
                    format!("deezer:{}", id),
                    track.title.unwrap_or_default(),
                    track.artist.and_then(|a| a.name).unwrap_or_default(),
                    PlaybackSource::Secondary,
                )
                .with_thumbnails(thumbnails)
                .with_duration_secs(track.duration.unwrap_or(0))
                .with_preview(non_empty(track.preview)),
            )
        })
        .collect())
}

#[async_trait]
impl SecondaryProvider for DeezerClient {
    fn name(&self) -> &str {
        "deezer"
    }

    async fn search(&self, query: &str, count: u32) -> Result<Vec<CanonicalResult>, ProviderError> {
        debug!(query = %query, count, "Searching Deezer");

        let limit = count.to_string();
        let request = self
            .client
            .get(format!("{}/search", self.config.base_url.trim_end_matches('/')))
            .timeout(self.config.timeout())
            .query(&[("q", query), ("limit", limit.as_str())]);

        let response: SearchResponse = fetch_json(request).await?;
        normalize(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_tracks() {
        let payload = r#"{
            "data": [
                {
                    "id": 3135556,
                    "title": "Harder, Better, Faster, Stronger",
                    "duration": 224,
                    "preview": "https://cdns-preview.dzcdn.net/stream/abc.mp3",
                    "artist": {"id": 27, "name": "Daft Punk"},
                    "album": {
                        "cover_small": "https://e-cdns-images.dzcdn.net/56x56.jpg",
                        "cover_medium": "https://e-cdns-images.dzcdn.net/250x250.jpg"
                    }
                },
                {"title": "No id"},
                {"id": 7, "title": "Bare", "preview": ""}
            ],
            "total": 3
        }"#;

        let response: SearchResponse = serde_json::from_str(payload).expect("parse");
        let results = normalize(response).expect("normalize");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].external_id, "deezer:3135556");
        assert_eq!(results[0].author_label, "Daft Punk");
        assert_eq!(results[0].duration_iso8601, "PT3M44S");
        assert_eq!(
            results[0].thumbnail_refs,
            vec![
                "https://e-cdns-images.dzcdn.net/250x250.jpg".to_string(),
                "https://e-cdns-images.dzcdn.net/56x56.jpg".to_string(),
            ]
        );
        assert_eq!(results[1].preview_ref, None);
        assert_eq!(results[1].duration_iso8601, "PT0S");
    }

    #[test]
    fn test_error_object_is_response_error() {
        let payload = r#"{"error": {"type": "Exception", "message": "Quota limit exceeded", "code": 4}}"#;
        let response: SearchResponse = serde_json::from_str(payload).expect("parse");

        let err = normalize(response).expect_err("should fail");
        assert_eq!(err.kind(), "response");
        assert!(err.to_string().contains("Quota limit exceeded"));
    }

    #[test]
    fn test_disabled_by_default() {
        assert!(!DeezerConfig::default().enabled);
    }
}
