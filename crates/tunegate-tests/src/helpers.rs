//! Test helper functions and utilities.

use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tunegate_api::{AppState, ServiceConfig, create_router};
use tunegate_gateway::SearchGateway;
use wiremock::MockServer;

/// Provider timeout used against mock upstreams.
pub const TEST_PROVIDER_TIMEOUT: Duration = Duration::from_millis(300);

/// One mock server per upstream provider.
pub struct MockUpstreams {
    pub youtube: MockServer,
    pub itunes: MockServer,
    pub deezer: MockServer,
}

impl MockUpstreams {
    pub async fn start() -> Self {
        Self {
            youtube: MockServer::start().await,
            itunes: MockServer::start().await,
            deezer: MockServer::start().await,
        }
    }

    /// Service configuration pointing every provider at its mock.
    ///
    /// Deezer is enabled so both secondaries are exercised.
    pub fn service_config(&self) -> ServiceConfig {
        let timeout_ms = TEST_PROVIDER_TIMEOUT.as_millis() as u64;
        let mut config = ServiceConfig::default();
        config.server.bind_addr = "127.0.0.1:0".to_string();

        config.providers.youtube.api_key = "test-key".to_string();
        config.providers.youtube.base_url = self.youtube.uri();
        config.providers.youtube.timeout_ms = timeout_ms;

        config.providers.itunes.base_url = self.itunes.uri();
        config.providers.itunes.timeout_ms = timeout_ms;

        config.providers.deezer.enabled = true;
        config.providers.deezer.base_url = self.deezer.uri();
        config.providers.deezer.timeout_ms = timeout_ms;
        config
    }
}

/// Build a gateway wired exactly like the server would be.
pub fn build_gateway(config: &ServiceConfig) -> Arc<SearchGateway> {
    AppState::from_config(config).gateway
}

/// Start an API server for testing and return its address.
pub async fn start_test_server(
    config: &ServiceConfig,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let state = Arc::new(AppState::from_config(config));
    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Test server stopped");
        }
    });

    Ok((addr, handle))
}

/// Client timeout; comfortably above every mock provider delay.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client bound to one in-process gateway.
pub struct ApiTestClient {
    client: Client,
    base_url: String,
}

impl ApiTestClient {
    pub fn new(addr: SocketAddr) -> Self {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .expect("Failed to create test client");
        Self {
            client,
            base_url: format!("http://{}", addr),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(self.url(path)).send().await
    }

    pub async fn post<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> reqwest::Result<reqwest::Response> {
        self.client.post(self.url(path)).json(body).send().await
    }

    /// POST a body verbatim with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
    }

    /// `GET /api/v1/search` with the given query-string pairs.
    pub async fn search(&self, query: &[(&str, &str)]) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(self.url("/api/v1/search"))
            .query(query)
            .send()
            .await
    }

    /// Decoded `/health` body; errors on a non-success status.
    pub async fn health(&self) -> anyhow::Result<serde_json::Value> {
        let resp = self.get("/health").await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}
