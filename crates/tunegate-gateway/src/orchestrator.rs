//! Tiered search orchestration.
//!
//! Each request moves through the same tiers, stopping at the first one
//! that produces results:
//!
//! 1. fresh cache entry
//! 2. primary provider, if the quota tracker grants a unit
//! 3. stale cache entry (one TTL past expiry)
//! 4. secondary providers in configured order, followed by enrichment
//! 5. a static placeholder, which is never cached

use crate::config::GatewayConfig;
use crate::enrichment::enrich;
use crate::metrics::GatewayMetrics;
use crate::placeholder::placeholder_results;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tunegate_cache::{CacheStatsSnapshot, PopularSlot, ResponseCache, search_key};
use tunegate_core::{
    BasicNormalizer, CanonicalResult, FallbackReason, FetchOutcome, Origin, QueryNormalizer,
    Result, SearchRequest, SearchResponse, validate_query,
};
use tunegate_providers::{PrimaryProvider, ProviderError, SecondaryProvider};
use tunegate_quota::{LISTING_BUCKET, QuotaTracker, SEARCH_BUCKET};

/// Shared result cache type.
pub type ResultCache = ResponseCache<Vec<CanonicalResult>>;

/// Search gateway; one instance per process, shared by `Arc`.
pub struct SearchGateway {
    config: GatewayConfig,
    quota: Arc<QuotaTracker>,
    cache: Arc<ResultCache>,
    popular: PopularSlot<Vec<CanonicalResult>>,
    primary: Arc<dyn PrimaryProvider>,
    secondaries: Vec<Arc<dyn SecondaryProvider>>,
    normalizer: Arc<dyn QueryNormalizer>,
    metrics: GatewayMetrics,
}

impl SearchGateway {
    pub fn new(
        config: GatewayConfig,
        quota: Arc<QuotaTracker>,
        primary: Arc<dyn PrimaryProvider>,
    ) -> Self {
        let cache = Arc::new(ResponseCache::from_config(&config.cache));
        let popular = PopularSlot::new(config.popular.ttl());
        Self {
            config,
            quota,
            cache,
            popular,
            primary,
            secondaries: Vec::new(),
            normalizer: Arc::new(BasicNormalizer),
            metrics: GatewayMetrics::default(),
        }
    }

    /// Append a fallback provider. Secondaries are tried in insertion order.
    pub fn with_secondary(mut self, provider: Arc<dyn SecondaryProvider>) -> Self {
        self.secondaries.push(provider);
        self
    }

    /// Replace the default [`BasicNormalizer`].
    pub fn with_normalizer(mut self, normalizer: Arc<dyn QueryNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    pub fn primary_name(&self) -> &str {
        self.primary.name()
    }

    pub fn secondary_names(&self) -> Vec<String> {
        self.secondaries.iter().map(|p| p.name().to_string()).collect()
    }

    /// Answer a search.
    ///
    /// Only a query that is empty or malformed after normalization is an
    /// error. Provider trouble always produces a response.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let query = self.normalizer.normalize(&request.query);
        if let Err(e) = validate_query(&query) {
            self.metrics.record_invalid();
            debug!(error = %e, "Rejected search query");
            return Err(e);
        }

        let key = search_key(&query, request.max_results, request.order);
        let outcome = self.resolve_search(&request, &query, &key).await;

        self.metrics.record_outcome(outcome.origin);
        info!(
            query = %query,
            key = %key,
            origin = %outcome.origin,
            source = %outcome.source,
            reason = outcome.fallback_reason.map(|r| r.as_str()),
            items = outcome.results.len(),
            "Search served"
        );

        let quota = self.quota.snapshot(SEARCH_BUCKET).info();
        Ok(outcome.into_response(Some(quota)))
    }

    async fn resolve_search(
        &self,
        request: &SearchRequest,
        query: &str,
        key: &str,
    ) -> FetchOutcome {
        let (count, order) = (request.max_results, request.order);
        if let Some(results) = self.cache.get(key) {
            debug!(key, "Cache hit");
            return FetchOutcome::new(results, Origin::Cache, "cache");
        }

        let reason = if self.quota.consume_one(SEARCH_BUCKET).allowed {
            match self.primary.search(query, count, order).await {
                Ok(results) => {
                    self.cache.put(key, results.clone(), self.config.cache.ttl());
                    return FetchOutcome::new(results, Origin::Primary, self.primary.name());
                }
                Err(e) => {
                    log_provider_error(self.primary.name(), "search", &e);
                    FallbackReason::PrimaryError
                }
            }
        } else {
            FallbackReason::QuotaExceeded
        };

        if let Some(results) = self.cache.get_stale(key) {
            debug!(key, reason = %reason, "Serving stale cache entry");
            return FetchOutcome::new(results, Origin::StaleCache, "stale-cache")
                .with_reason(reason);
        }

        match self.fetch_secondary(query, count, SEARCH_BUCKET).await {
            Some((source, results)) => {
                self.cache
                    .put(key, results.clone(), self.config.cache.degraded_ttl());
                FetchOutcome::new(results, Origin::Secondary, source).with_reason(reason)
            }
            // The placeholder echoes what the caller typed.
            None => self.placeholder(request.query.trim(), reason),
        }
    }

    /// Answer the popular listing. Never fails.
    pub async fn popular(&self) -> SearchResponse {
        let outcome = self.resolve_popular().await;

        self.metrics.record_outcome(outcome.origin);
        info!(
            origin = %outcome.origin,
            source = %outcome.source,
            reason = outcome.fallback_reason.map(|r| r.as_str()),
            items = outcome.results.len(),
            "Popular listing served"
        );

        let quota = self.quota.snapshot(LISTING_BUCKET).info();
        outcome.into_response(Some(quota))
    }

    async fn resolve_popular(&self) -> FetchOutcome {
        if let Some(results) = self.popular.get() {
            return FetchOutcome::new(results, Origin::Cache, "cache");
        }

        let count = self.config.popular.count();
        let reason = if self.quota.consume_one(LISTING_BUCKET).allowed {
            match self.primary.popular(count).await {
                Ok(results) => {
                    self.popular.set(results.clone());
                    return FetchOutcome::new(results, Origin::Primary, self.primary.name());
                }
                Err(e) => {
                    log_provider_error(self.primary.name(), "popular", &e);
                    FallbackReason::PrimaryError
                }
            }
        } else {
            FallbackReason::QuotaExceeded
        };

        if let Some(results) = self.popular.get_stale() {
            return FetchOutcome::new(results, Origin::StaleCache, "stale-cache")
                .with_reason(reason);
        }

        let seed = self.config.popular.seed_query();
        match self.fetch_secondary(seed, count, LISTING_BUCKET).await {
            Some((source, results)) => {
                self.popular.set(results.clone());
                FetchOutcome::new(results, Origin::Secondary, source).with_reason(reason)
            }
            None => self.placeholder(seed, reason),
        }
    }

    /// First non-empty secondary answer, enriched against `bucket`.
    async fn fetch_secondary(
        &self,
        query: &str,
        count: u32,
        bucket: &str,
    ) -> Option<(String, Vec<CanonicalResult>)> {
        for provider in &self.secondaries {
            match provider.search(query, count).await {
                Ok(results) if !results.is_empty() => {
                    let (results, summary) = enrich(
                        results,
                        self.config.enrichment.budget(),
                        bucket,
                        &self.quota,
                        self.primary.as_ref(),
                    )
                    .await;
                    self.metrics.record_enriched(u64::from(summary.enriched));
                    return Some((provider.name().to_string(), results));
                }
                Ok(_) => {
                    debug!(provider = provider.name(), query, "Secondary returned no results");
                }
                Err(e) => log_provider_error(provider.name(), "search", &e),
            }
        }
        None
    }

    fn placeholder(&self, query: &str, after: FallbackReason) -> FetchOutcome {
        error!(
            query,
            reason = %after,
            secondaries = self.secondaries.len(),
            "All sources failed, returning placeholder"
        );
        FetchOutcome::new(placeholder_results(query), Origin::Placeholder, "placeholder")
            .with_reason(FallbackReason::AllSourcesFailed)
    }
}

fn log_provider_error(provider: &str, operation: &str, err: &ProviderError) {
    match err {
        ProviderError::Transport(e) if e.is_timeout() => {
            warn!(provider, operation, "Provider call timed out");
        }
        ProviderError::Transport(e) => {
            warn!(provider, operation, error = %e, "Provider transport failure");
        }
        ProviderError::Response { status, body } => {
            warn!(provider, operation, status, body = %body, "Provider returned an error response");
        }
        ProviderError::Malformed(detail) => {
            error!(provider, operation, detail = %detail, "Provider returned a malformed payload");
        }
    }
}
