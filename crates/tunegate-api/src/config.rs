//! Service configuration.
//!
//! Loaded from an optional TOML file layered with `TUNEGATE__`-prefixed
//! environment variables, e.g. `TUNEGATE__QUOTA__LIMITS__SEARCH=50` or
//! `TUNEGATE__PROVIDERS__YOUTUBE__API_KEY=...`.

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tunegate_cache::CacheConfig;
use tunegate_core::{Error, Result};
use tunegate_gateway::{EnrichmentConfig, GatewayConfig, PopularConfig};
use tunegate_providers::{DeezerConfig, ItunesConfig, YouTubeConfig};
use tunegate_quota::QuotaConfig;

/// File read when no `--config` path is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "tunegate.toml";
const ENV_PREFIX: &str = "TUNEGATE";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub itunes: ItunesConfig,
    #[serde(default)]
    pub deezer: DeezerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

/// Complete service configuration. Every field has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub popular: PopularConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ServiceConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; without one, [`DEFAULT_CONFIG_FILE`]
    /// is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Settings consumed by the search gateway.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            cache: self.cache.clone(),
            popular: self.popular.clone(),
            enrichment: self.enrichment.clone(),
        }
    }
}
