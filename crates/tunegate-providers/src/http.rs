//! Shared HTTP plumbing for provider adapters.

use crate::provider::ProviderError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest upstream error body kept for logs.
const MAX_ERROR_BODY: usize = 512;

pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Send a request and decode a JSON body.
///
/// The caller must also set a per-request timeout so the bound holds even
/// when the client had to fall back to defaults.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(ProviderError::Transport)?;
    let status = response.status();
    let body = response.text().await.map_err(ProviderError::Transport)?;

    if !status.is_success() {
        return Err(ProviderError::Response {
            status: status.as_u16(),
            body: truncate(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Keep only non-empty strings.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_bodies() {
        let body = "x".repeat(600);
        let truncated = truncate(&body);
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" a ".to_string())), Some("a".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
