//! Static results returned when every tier has failed.

use sha2::{Digest, Sha256};
use tunegate_core::{CanonicalResult, PlaybackSource};

/// Author label shown on placeholder items.
const PLACEHOLDER_AUTHOR: &str = "Tunegate";

/// Deterministic placeholder for a query. Never cached.
pub fn placeholder_results(query: &str) -> Vec<CanonicalResult> {
    let hash = Sha256::digest(query.as_bytes());
    let id = format!("placeholder:{}", hex::encode(&hash[..6]));

    vec![CanonicalResult::new(
        id,
        format!("No results available right now for \"{}\"", query),
        PLACEHOLDER_AUTHOR,
        PlaybackSource::Placeholder,
    )]
}
