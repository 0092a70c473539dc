//! Cache key generation utilities.

use sha2::{Digest, Sha256};
use tunegate_core::SearchOrder;

/// Case-fold and collapse whitespace so equivalent queries share a key.
pub fn normalize_query_text(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate the cache key for a search.
///
/// The query text is hashed so keys stay short and printable regardless of
/// what users type.
pub fn search_key(query: &str, count: u32, order: SearchOrder) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_query_text(query).as_bytes());
    let hash = hasher.finalize();

    format!("search:{}:{}:{}", order, count, hex::encode(&hash[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_requests_share_key() {
        let a = search_key("Despacito", 5, SearchOrder::Relevance);
        let b = search_key("  despacito ", 5, SearchOrder::Relevance);
        assert_eq!(a, b);
        assert!(a.starts_with("search:relevance:5:"));
    }

    #[test]
    fn test_count_and_order_split_keys() {
        let base = search_key("despacito", 5, SearchOrder::Relevance);
        assert_ne!(base, search_key("despacito", 6, SearchOrder::Relevance));
        assert_ne!(base, search_key("despacito", 5, SearchOrder::ViewCount));
        assert_ne!(base, search_key("despacito remix", 5, SearchOrder::Relevance));
    }

    #[test]
    fn test_normalize_query_text() {
        assert_eq!(normalize_query_text("Daft  PUNK\n"), "daft punk");
    }
}
