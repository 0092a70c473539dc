//! Fixed-window quota tracker.

use crate::config::QuotaConfig;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use tunegate_core::QuotaInfo;

/// Counter for one traffic class.
#[derive(Debug)]
struct QuotaBucket {
    window_start: Instant,
    used: u32,
    limit: u32,
}

impl QuotaBucket {
    fn new(now: Instant, limit: u32) -> Self {
        Self {
            window_start: now,
            used: 0,
            limit,
        }
    }

    fn window_elapsed(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }

    /// Start a new window if the current one has run out.
    fn roll(&mut self, now: Instant, window: Duration) {
        if self.window_elapsed(now, window) {
            self.window_start = now;
            self.used = 0;
        }
    }

    fn reset_in(&self, now: Instant, window: Duration) -> Duration {
        window.saturating_sub(now.saturating_duration_since(self.window_start))
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub window_reset_in: Duration,
}

impl QuotaDecision {
    /// Envelope form, with the reset rounded up to whole seconds.
    pub fn info(&self) -> QuotaInfo {
        let secs = self.window_reset_in.as_secs()
            + u64::from(self.window_reset_in.subsec_nanos() > 0);
        QuotaInfo {
            remaining: self.remaining,
            limit: self.limit,
            window_reset_in: secs,
        }
    }
}

/// Shared quota tracker; one instance per process.
///
/// Check-and-increment happens inside a single critical section so
/// concurrent callers can never be granted more than `limit` per window.
pub struct QuotaTracker {
    config: QuotaConfig,
    window: Duration,
    buckets: Mutex<HashMap<String, QuotaBucket>>,
}

impl QuotaTracker {
    /// Create a tracker with every configured bucket starting a fresh window.
    pub fn new(config: QuotaConfig) -> Self {
        let now = Instant::now();
        let buckets = config
            .limits
            .keys()
            .map(|name| (name.clone(), QuotaBucket::new(now, config.limit_for(name))))
            .collect();

        Self {
            window: config.window(),
            config,
            buckets: Mutex::new(buckets),
        }
    }

    /// Window length shared by every bucket.
    pub fn window(&self) -> Duration {
        self.window
    }

    // A panic while holding the lock cannot leave a bucket half-updated,
    // so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, QuotaBucket>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Try to spend `cost` units from `bucket`.
    ///
    /// Unknown buckets are created with the default limit. A denial leaves
    /// the bucket untouched.
    pub fn consume(&self, bucket: &str, cost: u32) -> QuotaDecision {
        let now = Instant::now();
        let decision = {
            let mut buckets = self.lock();
            let state = buckets
                .entry(bucket.to_string())
                .or_insert_with(|| QuotaBucket::new(now, self.config.limit_for(bucket)));

            state.roll(now, self.window);

            let allowed = state
                .used
                .checked_add(cost)
                .is_some_and(|total| total <= state.limit);
            if allowed {
                state.used += cost;
            }

            QuotaDecision {
                allowed,
                remaining: state.limit - state.used,
                limit: state.limit,
                window_reset_in: state.reset_in(now, self.window),
            }
        };

        if decision.allowed {
            debug!(bucket, cost, remaining = decision.remaining, "Quota granted");
        } else {
            warn!(
                bucket,
                cost,
                limit = decision.limit,
                reset_in_ms = decision.window_reset_in.as_millis() as u64,
                "Quota exhausted"
            );
        }
        decision
    }

    /// Spend a single unit.
    pub fn consume_one(&self, bucket: &str) -> QuotaDecision {
        self.consume(bucket, 1)
    }

    /// Report the remaining budget without spending or resetting anything.
    pub fn snapshot(&self, bucket: &str) -> QuotaDecision {
        let now = Instant::now();
        let buckets = self.lock();
        match buckets.get(bucket) {
            Some(state) if !state.window_elapsed(now, self.window) => {
                let remaining = state.limit - state.used;
                QuotaDecision {
                    allowed: remaining > 0,
                    remaining,
                    limit: state.limit,
                    window_reset_in: state.reset_in(now, self.window),
                }
            }
            Some(state) => self.fresh_window(state.limit),
            None => self.fresh_window(self.config.limit_for(bucket)),
        }
    }

    /// Snapshots of every known bucket, sorted by name.
    pub fn snapshot_all(&self) -> Vec<(String, QuotaDecision)> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let decision = self.snapshot(&name);
                (name, decision)
            })
            .collect()
    }

    fn fresh_window(&self, limit: u32) -> QuotaDecision {
        QuotaDecision {
            allowed: limit > 0,
            remaining: limit,
            limit,
            window_reset_in: self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_LIMIT, LISTING_BUCKET, SEARCH_BUCKET};
    use std::sync::Arc;

    fn tracker(limit: i64) -> QuotaTracker {
        QuotaTracker::new(
            QuotaConfig::default()
                .with_limit(SEARCH_BUCKET, limit)
                .with_window(Duration::from_secs(60)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_grants_exactly_limit_then_denies() {
        let tracker = tracker(3);

        for expected_remaining in [2, 1, 0] {
            let decision = tracker.consume_one(SEARCH_BUCKET);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = tracker.consume_one(SEARCH_BUCKET);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.limit, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_window_is_capped() {
        let tracker = QuotaTracker::new(QuotaConfig::default().with_window(Duration::MAX));
        assert_eq!(tracker.window(), crate::config::MAX_WINDOW);

        let decision = tracker.consume_one(SEARCH_BUCKET);
        assert!(decision.allowed);
        assert_eq!(decision.window_reset_in, crate::config::MAX_WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_length() {
        let tracker = tracker(2);
        assert!(tracker.consume_one(SEARCH_BUCKET).allowed);
        assert!(tracker.consume_one(SEARCH_BUCKET).allowed);
        assert!(!tracker.consume_one(SEARCH_BUCKET).allowed);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!tracker.consume_one(SEARCH_BUCKET).allowed);

        tokio::time::advance(Duration::from_secs(1)).await;
        let decision = tracker.consume_one(SEARCH_BUCKET);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
        assert_eq!(decision.window_reset_in, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_denial_does_not_increment() {
        let tracker = tracker(5);
        assert!(tracker.consume(SEARCH_BUCKET, 4).allowed);

        let denied = tracker.consume(SEARCH_BUCKET, 2);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 1);

        // The unit left over is still grantable.
        assert!(tracker.consume(SEARCH_BUCKET, 1).allowed);
        assert_eq!(tracker.snapshot(SEARCH_BUCKET).remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buckets_are_independent() {
        let tracker = QuotaTracker::new(
            QuotaConfig::default()
                .with_limit(SEARCH_BUCKET, 1)
                .with_limit(LISTING_BUCKET, 1),
        );

        assert!(tracker.consume_one(SEARCH_BUCKET).allowed);
        assert!(!tracker.consume_one(SEARCH_BUCKET).allowed);
        assert!(tracker.consume_one(LISTING_BUCKET).allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_is_read_only() {
        let tracker = tracker(2);
        tracker.consume_one(SEARCH_BUCKET);

        let first = tracker.snapshot(SEARCH_BUCKET);
        let second = tracker.snapshot(SEARCH_BUCKET);
        assert_eq!(first.remaining, 1);
        assert_eq!(second.remaining, 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        let after_window = tracker.snapshot(SEARCH_BUCKET);
        assert_eq!(after_window.remaining, 2);
        assert_eq!(after_window.window_reset_in, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_bucket_uses_default_limit() {
        let tracker = tracker(10);
        assert_eq!(tracker.snapshot("imports").limit, DEFAULT_LIMIT);

        let decision = tracker.consume_one("imports");
        assert!(decision.allowed);
        assert_eq!(decision.limit, DEFAULT_LIMIT);
        assert!(tracker.snapshot_all().iter().any(|(name, _)| name == "imports"));
    }

    #[test]
    fn test_info_rounds_reset_up() {
        let decision = QuotaDecision {
            allowed: true,
            remaining: 3,
            limit: 10,
            window_reset_in: Duration::from_millis(1500),
        };
        assert_eq!(decision.info().window_reset_in, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_consume_never_over_grants() {
        let tracker = Arc::new(tracker(50));

        let tasks = (0..400).map(|i| {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move {
                let cost = if i % 3 == 0 { 2 } else { 1 };
                let decision = tracker.consume(SEARCH_BUCKET, cost);
                if decision.allowed { cost } else { 0 }
            })
        });

        let granted: u32 = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.expect("task panicked"))
            .sum();

        assert!(granted <= 50, "granted {} units against a limit of 50", granted);
        assert_eq!(tracker.snapshot(SEARCH_BUCKET).remaining, 50 - granted);
    }
}
