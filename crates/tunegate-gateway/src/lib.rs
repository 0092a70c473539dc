//! Search orchestration for Tunegate.
//!
//! [`SearchGateway`] walks each request through cache, quota, primary
//! provider, stale cache, secondary providers with bounded enrichment and
//! finally a static placeholder. Only an invalid query is reported as an
//! error; every other failure degrades to a lower tier.

pub mod config;
pub mod enrichment;
pub mod metrics;
pub mod orchestrator;
pub mod placeholder;

pub use config::{EnrichmentConfig, GatewayConfig, PopularConfig};
pub use enrichment::{EnrichmentSummary, StopReason, enrich};
pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use orchestrator::SearchGateway;
pub use placeholder::placeholder_results;
