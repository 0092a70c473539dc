//! Search handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tunegate_core::{Error, Result, SearchOrder, SearchRequest, SearchResponse};

use super::ApiError;
use crate::state::AppState;

/// Query-string form: `?q=&maxResults=&order=`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
    pub order: Option<String>,
}

impl SearchParams {
    pub fn into_request(self) -> Result<SearchRequest> {
        let max_results = self.max_results.as_deref().and_then(parse_count);
        build_request(self.q, max_results, self.order.as_deref())
    }
}

/// JSON body form of the same request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    #[serde(alias = "q")]
    pub query: Option<String>,
    pub max_results: Option<Value>,
    pub order: Option<String>,
}

impl SearchBody {
    pub fn into_request(self) -> Result<SearchRequest> {
        let max_results = match self.max_results {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => parse_count(&s),
            _ => None,
        };
        build_request(self.query, max_results, self.order.as_deref())
    }
}

/// Unparseable counts are treated as absent.
fn parse_count(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn build_request(
    query: Option<String>,
    max_results: Option<i64>,
    order: Option<&str>,
) -> Result<SearchRequest> {
    let order = match order.map(str::trim) {
        None | Some("") => SearchOrder::default(),
        Some(raw) => raw.parse()?,
    };
    Ok(SearchRequest::new(query.unwrap_or_default(), max_results, order))
}

pub async fn search_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<SearchResponse>, ApiError> {
    let request = params.into_request()?;
    Ok(Json(state.gateway.search(request).await?))
}

pub async fn search_body(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<SearchBody>, JsonRejection>,
) -> std::result::Result<Json<SearchResponse>, ApiError> {
    let Json(body) = body.map_err(body_error)?;
    let request = body.into_request()?;
    Ok(Json(state.gateway.search(request).await?))
}

/// Unreadable bodies share the `{error}` envelope of other bad requests.
fn body_error(rejection: JsonRejection) -> Error {
    Error::InvalidInput(rejection.body_text())
}
