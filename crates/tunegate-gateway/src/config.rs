//! Runtime gateway settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tunegate_cache::{CacheConfig, DEFAULT_POPULAR_TTL, MAX_TTL};
use tunegate_core::request::{MAX_RESULTS, MIN_RESULTS};

pub const DEFAULT_ENRICHMENT_BUDGET: u32 = 3;
pub const DEFAULT_POPULAR_COUNT: u32 = 12;
pub const DEFAULT_SEED_QUERY: &str = "top hits";

/// Enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Primary lookups allowed per degraded request.
    #[serde(default = "default_budget")]
    pub budget: i64,
}

fn default_budget() -> i64 {
    DEFAULT_ENRICHMENT_BUDGET as i64
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
        }
    }
}

impl EnrichmentConfig {
    /// Zero disables enrichment; negative values use the default.
    pub fn budget(&self) -> u32 {
        if self.budget < 0 {
            DEFAULT_ENRICHMENT_BUDGET
        } else {
            self.budget.min(u32::MAX as i64) as u32
        }
    }
}

/// Popular listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularConfig {
    #[serde(default = "default_popular_ttl_secs")]
    pub ttl_secs: i64,
    #[serde(default = "default_popular_count")]
    pub count: i64,
    /// Query sent to secondary providers, which have no chart endpoint.
    #[serde(default = "default_seed_query")]
    pub seed_query: String,
}

fn default_popular_ttl_secs() -> i64 {
    DEFAULT_POPULAR_TTL.as_secs() as i64
}

fn default_popular_count() -> i64 {
    DEFAULT_POPULAR_COUNT as i64
}

fn default_seed_query() -> String {
    DEFAULT_SEED_QUERY.to_string()
}

impl Default for PopularConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_popular_ttl_secs(),
            count: default_popular_count(),
            seed_query: default_seed_query(),
        }
    }
}

impl PopularConfig {
    pub fn ttl(&self) -> Duration {
        if self.ttl_secs > 0 {
            Duration::from_secs(self.ttl_secs as u64).min(MAX_TTL)
        } else {
            DEFAULT_POPULAR_TTL
        }
    }

    pub fn count(&self) -> u32 {
        if self.count > 0 {
            self.count.clamp(MIN_RESULTS as i64, MAX_RESULTS as i64) as u32
        } else {
            DEFAULT_POPULAR_COUNT
        }
    }

    pub fn seed_query(&self) -> &str {
        let seed = self.seed_query.trim();
        if seed.is_empty() { DEFAULT_SEED_QUERY } else { seed }
    }
}

/// Everything the orchestrator needs besides its collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub popular: PopularConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

impl GatewayConfig {
    pub fn with_enrichment_budget(mut self, budget: u32) -> Self {
        self.enrichment.budget = budget as i64;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration, degraded_ttl: Duration) -> Self {
        self.cache.ttl_secs = ttl.as_secs() as i64;
        self.cache.degraded_ttl_secs = degraded_ttl.as_secs() as i64;
        self
    }
}
