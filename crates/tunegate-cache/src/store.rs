//! Bounded TTL cache for search results.

use crate::types::{CacheConfig, CacheStats, CacheStatsSnapshot, MAX_TTL};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry<V> {
    payload: V,
    expires_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Entries stay readable through `get_stale` for one extra TTL.
    fn is_within_stale_horizon(&self, now: Instant) -> bool {
        now < self.expires_at + self.ttl
    }
}

/// Shared response cache; one instance per process.
///
/// Payloads are cloned in and out, so callers never hold references into
/// cache-owned memory. Eviction on overflow removes the entries closest to
/// expiry first.
pub struct ResponseCache<V> {
    capacity: usize,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    stats: CacheStats,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
            stats: CacheStats::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh lookup. Expired entries count as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        let (payload, expired_for_good) = match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => (Some(entry.payload.clone()), false),
            Some(entry) => (None, !entry.is_within_stale_horizon(now)),
            None => (None, false),
        };

        if expired_for_good {
            entries.remove(key);
            self.stats.record_expiration();
        }

        match payload {
            Some(payload) => {
                self.stats.record_hit();
                Some(payload)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Lookup that also accepts an entry up to one TTL past its expiry.
    pub fn get_stale(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_within_stale_horizon(now) => {
                self.stats.record_stale_hit();
                Some(entry.payload.clone())
            }
            Some(_) => {
                entries.remove(key);
                self.stats.record_expiration();
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite an entry, then evict down to capacity.
    ///
    /// `ttl` is capped at [`MAX_TTL`].
    pub fn put(&self, key: impl Into<String>, payload: V, ttl: Duration) {
        let key = key.into();
        let ttl = ttl.min(MAX_TTL);
        let now = Instant::now();
        let mut entries = self.lock();

        entries.insert(
            key.clone(),
            CacheEntry {
                payload,
                expires_at: now + ttl,
                ttl,
            },
        );
        self.stats.record_insert();

        let overflow = entries.len().saturating_sub(self.capacity);
        if overflow == 0 {
            return;
        }

        let mut by_expiry: Vec<(Instant, String)> = entries
            .iter()
            .map(|(k, entry)| (entry.expires_at, k.clone()))
            .collect();
        by_expiry.sort();

        for (_, victim) in by_expiry.into_iter().take(overflow) {
            entries.remove(&victim);
        }
        self.stats.record_evictions(overflow as u64);
        debug!(
            key = %key,
            evicted = overflow,
            "Cache over capacity, evicted nearest-expiry entries"
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot(self.len(), self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_put_then_get_round_trips() {
        let cache = ResponseCache::new(10);
        cache.put("k", vec!["a".to_string(), "b".to_string()], TTL);

        assert_eq!(cache.get("k"), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_expiry_is_miss() {
        let cache = ResponseCache::new(10);
        cache.put("k", 1u32, TTL);

        tokio::time::advance(TTL).await;
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites() {
        let cache = ResponseCache::new(10);
        cache.put("k", 1u32, TTL);
        cache.put("k", 2u32, TTL);

        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_read_within_one_generation() {
        let cache = ResponseCache::new(10);
        cache.put("k", 7u32, TTL);

        tokio::time::advance(TTL + Duration::from_secs(30)).await;
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.get_stale("k"), Some(7));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get_stale("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_drops_entries_past_stale_horizon() {
        let cache = ResponseCache::new(10);
        cache.put("k", 7u32, TTL);

        tokio::time::advance(TTL * 2).await;
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_nearest_expiry_first() {
        let cache = ResponseCache::new(3);
        cache.put("long", 1u32, Duration::from_secs(300));
        cache.put("short", 2u32, Duration::from_secs(10));
        cache.put("medium", 3u32, Duration::from_secs(60));
        cache.put("newest", 4u32, Duration::from_secs(120));

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some(1));
        assert_eq!(cache.get("medium"), Some(3));
        assert_eq!(cache.get("newest"), Some(4));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_empties_cache() {
        let cache = ResponseCache::new(10);
        cache.put("a", 1u32, TTL);
        cache.put("b", 2u32, TTL);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_stale("a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_does_not_overflow() {
        let cache = ResponseCache::new(10);
        cache.put("k", 1u32, Duration::MAX);

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.get_stale("k"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_len_never_exceeds_capacity() {
        let cache = ResponseCache::new(5);
        for i in 0..50u64 {
            cache.put(format!("k{}", i), i, Duration::from_secs(1 + (i * 7) % 13));
            assert!(cache.len() <= 5);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_respect_capacity() {
        let cache = Arc::new(ResponseCache::new(16));

        let tasks = (0..200u64).map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache.put(format!("k{}", i % 40), vec![i; 3], TTL);
                cache.get(&format!("k{}", (i + 1) % 40))
            })
        });

        for result in futures::future::join_all(tasks).await {
            if let Some(payload) = result.expect("task panicked") {
                // Whole payloads only: every element was written together.
                assert!(payload.iter().all(|v| *v == payload[0]));
            }
        }
        assert!(cache.len() <= 16);
    }
}
