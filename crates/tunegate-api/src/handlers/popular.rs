//! Popular listing handler.

use axum::{Json, extract::State};
use std::sync::Arc;
use tunegate_core::SearchResponse;

use crate::state::AppState;

pub async fn popular(State(state): State<Arc<AppState>>) -> Json<SearchResponse> {
    Json(state.gateway.popular().await)
}
