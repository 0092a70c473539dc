//! Cache configuration and statistics.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_DEGRADED_TTL: Duration = Duration::from_secs(2 * 60);
pub const DEFAULT_CAPACITY: usize = 500;
/// Upper bound on any entry lifetime.
pub const MAX_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a result fetched from the primary provider.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,
    /// Lifetime of a result produced by a fallback provider.
    #[serde(default = "default_degraded_ttl_secs")]
    pub degraded_ttl_secs: i64,
    /// Maximum number of entries.
    #[serde(default = "default_capacity")]
    pub capacity: i64,
}

fn default_ttl_secs() -> i64 {
    DEFAULT_TTL.as_secs() as i64
}

fn default_degraded_ttl_secs() -> i64 {
    DEFAULT_DEGRADED_TTL.as_secs() as i64
}

fn default_capacity() -> i64 {
    DEFAULT_CAPACITY as i64
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            degraded_ttl_secs: default_degraded_ttl_secs(),
            capacity: default_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        secs_or(self.ttl_secs, DEFAULT_TTL)
    }

    pub fn degraded_ttl(&self) -> Duration {
        secs_or(self.degraded_ttl_secs, DEFAULT_DEGRADED_TTL)
    }

    pub fn capacity(&self) -> usize {
        if self.capacity > 0 {
            self.capacity as usize
        } else {
            DEFAULT_CAPACITY
        }
    }
}

fn secs_or(secs: i64, fallback: Duration) -> Duration {
    if secs > 0 {
        Duration::from_secs(secs as u64).min(MAX_TTL)
    } else {
        fallback
    }
}

/// Cache counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub stale_hits: AtomicU64,
    pub inserts: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_hit(&self) {
        self.stale_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entries: usize, capacity: usize) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            entries,
            capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time view of the cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsSnapshot {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub stale_hits: u64,
    pub inserts: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStatsSnapshot {
    /// Fraction of fresh lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
