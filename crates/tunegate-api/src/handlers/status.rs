//! Gateway status handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tunegate_cache::CacheStatsSnapshot;
use tunegate_core::QuotaInfo;
use tunegate_gateway::MetricsSnapshot;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStatus {
    pub bucket: String,
    #[serde(flatten)]
    pub quota: QuotaInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: i64,
    pub primary: String,
    pub secondaries: Vec<String>,
    pub quota: Vec<BucketStatus>,
    pub cache: CacheStatsSnapshot,
    pub cache_hit_rate: f64,
    pub outcomes: MetricsSnapshot,
    pub total_served: u64,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let gateway = &state.gateway;
    let quota = gateway
        .quota()
        .snapshot_all()
        .into_iter()
        .map(|(bucket, decision)| BucketStatus {
            bucket,
            quota: decision.info(),
        })
        .collect();
    let cache = gateway.cache_stats();
    let outcomes = gateway.metrics().snapshot();

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        primary: gateway.primary_name().to_string(),
        secondaries: gateway.secondary_names(),
        quota,
        cache_hit_rate: cache.hit_rate(),
        cache,
        total_served: outcomes.total_served(),
        outcomes,
    })
}
