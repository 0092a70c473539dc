//! Single-slot cache for the popular listing.

use crate::types::MAX_TTL;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Popular listing lifetime (10 minutes).
pub const DEFAULT_POPULAR_TTL: Duration = Duration::from_secs(10 * 60);

struct Slot<V> {
    value: V,
    cached_at: Instant,
}

/// One coarse-grained entry, shared by every popular-listing request.
pub struct PopularSlot<V> {
    ttl: Duration,
    slot: Mutex<Option<Slot<V>>>,
}

impl<V: Clone> PopularSlot<V> {
    /// `ttl` is capped at [`MAX_TTL`].
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_TTL),
            slot: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Slot<V>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value if still within its TTL.
    pub fn get(&self) -> Option<V> {
        self.lock()
            .as_ref()
            .filter(|slot| slot.cached_at.elapsed() < self.ttl)
            .map(|slot| slot.value.clone())
    }

    /// Cached value up to one TTL past expiry.
    pub fn get_stale(&self) -> Option<V> {
        self.lock()
            .as_ref()
            .filter(|slot| slot.cached_at.elapsed() < self.ttl * 2)
            .map(|slot| slot.value.clone())
    }

    pub fn set(&self, value: V) {
        *self.lock() = Some(Slot {
            value,
            cached_at: Instant::now(),
        });
    }
}

impl<V: Clone> Default for PopularSlot<V> {
    fn default() -> Self {
        Self::new(DEFAULT_POPULAR_TTL)
    }
}
