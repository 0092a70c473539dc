//! Upstream provider adapters for Tunegate.
//!
//! Every provider-specific field name lives in this crate. Each adapter
//! deserializes its provider's payload into private structs and converts
//! them into [`tunegate_core::CanonicalResult`]; nothing downstream sees a
//! raw provider shape.

pub mod deezer;
mod http;
pub mod itunes;
pub mod provider;
pub mod youtube;

pub use deezer::{DeezerClient, DeezerConfig};
pub use itunes::{ItunesClient, ItunesConfig};
pub use provider::{PrimaryProvider, ProviderError, SecondaryProvider};
pub use youtube::{YouTubeClient, YouTubeConfig};
