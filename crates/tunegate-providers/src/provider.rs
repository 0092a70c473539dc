//! Provider traits and errors.

use async_trait::async_trait;
use thiserror::Error;
use tunegate_core::{CanonicalResult, SearchOrder};

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection failure or timeout before a response arrived.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The provider answered with a non-success status.
    #[error("Provider returned {status}: {body}")]
    Response { status: u16, body: String },
    /// The body could not be understood.
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Short label used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Transport(e) if e.is_timeout() => "timeout",
            ProviderError::Transport(_) => "transport",
            ProviderError::Response { .. } => "response",
            ProviderError::Malformed(_) => "malformed",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Transport(e) if e.is_timeout())
    }
}

/// The authoritative, quota-limited provider.
#[async_trait]
pub trait PrimaryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Search for tracks.
    async fn search(
        &self,
        query: &str,
        count: u32,
        order: SearchOrder,
    ) -> Result<Vec<CanonicalResult>, ProviderError>;

    /// Best single match for a query, used to enrich fallback results.
    async fn lookup(&self, query: &str) -> Result<Option<CanonicalResult>, ProviderError> {
        let results = self.search(query, 1, SearchOrder::Relevance).await?;
        Ok(results.into_iter().next())
    }

    /// Currently popular music.
    async fn popular(&self, count: u32) -> Result<Vec<CanonicalResult>, ProviderError>;
}

/// An unauthenticated fallback catalog.
#[async_trait]
pub trait SecondaryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Search the catalog. Results are marked `PlaybackSource::Secondary`.
    async fn search(&self, query: &str, count: u32) -> Result<Vec<CanonicalResult>, ProviderError>;
}
