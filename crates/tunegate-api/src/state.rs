//! Application state shared across handlers.

use crate::config::ServiceConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use tunegate_gateway::SearchGateway;
use tunegate_providers::{DeezerClient, ItunesClient, YouTubeClient};
use tunegate_quota::QuotaTracker;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SearchGateway>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(gateway: Arc<SearchGateway>) -> Self {
        Self {
            gateway,
            started_at: Utc::now(),
        }
    }

    /// Wire the real providers, quota tracker and cache from configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let quota = Arc::new(QuotaTracker::new(config.quota.clone()));
        let primary = Arc::new(YouTubeClient::new(config.providers.youtube.clone()));

        let mut gateway = SearchGateway::new(config.gateway_config(), quota, primary);
        if config.providers.itunes.enabled {
            gateway = gateway.with_secondary(Arc::new(ItunesClient::new(
                config.providers.itunes.clone(),
            )));
        }
        if config.providers.deezer.enabled {
            gateway = gateway.with_secondary(Arc::new(DeezerClient::new(
                config.providers.deezer.clone(),
            )));
        }

        info!(
            primary = gateway.primary_name(),
            secondaries = ?gateway.secondary_names(),
            "Search gateway ready"
        );
        Self::new(Arc::new(gateway))
    }
}
