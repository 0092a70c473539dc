//! Tunegate Core
//!
//! Canonical result types, the response envelope, duration helpers and
//! error handling shared by every Tunegate crate. This crate has minimal
//! dependencies and defines the vocabulary used by the quota tracker, the
//! cache, the provider adapters and the gateway.

pub mod duration;
pub mod error;
pub mod normalize;
pub mod request;
pub mod result;

pub use error::{Error, Result};
pub use normalize::{BasicNormalizer, QueryNormalizer, validate_query};
pub use request::{
    FallbackReason, FetchOutcome, Origin, QuotaInfo, SearchOrder, SearchRequest, SearchResponse,
};
pub use result::{CanonicalResult, PlaybackSource};
