//! Canonical search result shape.

use crate::duration::{ZERO_DURATION, format_iso8601};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the playable identifier of a result comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackSource {
    /// Found directly on the primary provider.
    Primary,
    /// Secondary catalog hit with no primary identifier.
    Secondary,
    /// Secondary catalog hit matched back to a primary identifier.
    SecondaryEnriched,
    /// Synthetic result returned when every source failed.
    Placeholder,
}

impl PlaybackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackSource::Primary => "primary",
            PlaybackSource::Secondary => "secondary",
            PlaybackSource::SecondaryEnriched => "secondary-enriched",
            PlaybackSource::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for PlaybackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search hit, independent of the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResult {
    /// Stable, non-empty identifier.
    pub external_id: String,
    pub title: String,
    pub author_label: String,
    #[serde(default)]
    pub thumbnail_refs: Vec<String>,
    /// Always a well-formed ISO-8601 duration; `PT0S` when unknown.
    pub duration_iso8601: String,
    pub playback_source: PlaybackSource,
    /// Short audio preview, only offered by some secondary catalogs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_ref: Option<String>,
}

impl CanonicalResult {
    pub fn new(
        external_id: impl Into<String>,
        title: impl Into<String>,
        author_label: impl Into<String>,
        playback_source: PlaybackSource,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            author_label: author_label.into(),
            thumbnail_refs: Vec::new(),
            duration_iso8601: ZERO_DURATION.to_string(),
            playback_source,
            preview_ref: None,
        }
    }

    pub fn with_thumbnails(mut self, thumbnails: Vec<String>) -> Self {
        self.thumbnail_refs = thumbnails;
        self
    }

    pub fn with_duration(mut self, duration_iso8601: impl Into<String>) -> Self {
        self.duration_iso8601 = duration_iso8601.into();
        self
    }

    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_iso8601 = format_iso8601(secs);
        self
    }

    pub fn with_preview(mut self, preview_ref: Option<String>) -> Self {
        self.preview_ref = preview_ref;
        self
    }

    /// Whether this item still lacks a primary playable identifier.
    pub fn needs_enrichment(&self) -> bool {
        self.playback_source == PlaybackSource::Secondary
    }

    pub fn has_known_duration(&self) -> bool {
        self.duration_iso8601 != ZERO_DURATION
    }

    /// Query text used to look this item up on another provider.
    pub fn lookup_query(&self) -> String {
        if self.author_label.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.author_label)
        }
    }
}
