//! Per-request outcome counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tunegate_core::Origin;

/// Counts how each request was answered.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    pub primary: AtomicU64,
    pub cache: AtomicU64,
    pub stale_cache: AtomicU64,
    pub secondary: AtomicU64,
    pub placeholder: AtomicU64,
    /// Requests rejected before any tier ran.
    pub invalid: AtomicU64,
    /// Primary lookups that turned a secondary item into an enriched one.
    pub enriched_items: AtomicU64,
}

impl GatewayMetrics {
    pub fn record_outcome(&self, origin: Origin) {
        let counter = match origin {
            Origin::Primary => &self.primary,
            Origin::Cache => &self.cache,
            Origin::StaleCache => &self.stale_cache,
            Origin::Secondary => &self.secondary,
            Origin::Placeholder => &self.placeholder,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enriched(&self, count: u64) {
        self.enriched_items.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            primary: self.primary.load(Ordering::Relaxed),
            cache: self.cache.load(Ordering::Relaxed),
            stale_cache: self.stale_cache.load(Ordering::Relaxed),
            secondary: self.secondary.load(Ordering::Relaxed),
            placeholder: self.placeholder.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            enriched_items: self.enriched_items.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`GatewayMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub primary: u64,
    pub cache: u64,
    pub stale_cache: u64,
    pub secondary: u64,
    pub placeholder: u64,
    pub invalid: u64,
    pub enriched_items: u64,
}

impl MetricsSnapshot {
    /// Requests that reached a terminal tier.
    pub fn total_served(&self) -> u64 {
        self.primary + self.cache + self.stale_cache + self.secondary + self.placeholder
    }
}
