//! Provider quota tracking for Tunegate.
//!
//! One fixed window per bucket, reset lazily on access. Buckets are
//! independent per traffic class so background listing traffic cannot
//! starve interactive search.

pub mod config;
pub mod tracker;

pub use config::{
    DEFAULT_LIMIT, DEFAULT_WINDOW, LISTING_BUCKET, MAX_WINDOW, QuotaConfig, SEARCH_BUCKET,
};
pub use tracker::{QuotaDecision, QuotaTracker};
