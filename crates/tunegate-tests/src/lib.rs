//! Integration test infrastructure for Tunegate.
//!
//! Upstream providers are replaced by `wiremock` servers and the API runs
//! in-process on an ephemeral port.
//!
//! # Usage
//!
//! ```ignore
//! use tunegate_tests::{MockUpstreams, start_test_server, ApiTestClient};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let upstreams = MockUpstreams::start().await;
//!     let (addr, _handle) = start_test_server(&upstreams.service_config()).await.unwrap();
//!     let client = ApiTestClient::new(addr);
//! }
//! ```

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tunegate=debug")),
        )
        .with_test_writer()
        .try_init();
}
