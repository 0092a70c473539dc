//! In-memory response cache for Tunegate.
//!
//! Bounded key to result store with TTL expiry, nearest-expiry eviction and
//! a one-generation stale read path, plus the single-slot cache used by the
//! popular listing. Nothing here survives a restart.

pub mod keys;
pub mod slot;
pub mod store;
pub mod types;

pub use keys::{normalize_query_text, search_key};
pub use slot::{DEFAULT_POPULAR_TTL, PopularSlot};
pub use store::ResponseCache;
pub use types::{CacheConfig, CacheStats, CacheStatsSnapshot, MAX_TTL};
