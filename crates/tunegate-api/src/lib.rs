//! HTTP API server for Tunegate.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use routes::create_router;
pub use state::AppState;
