//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: `Default` implementations of every section
//! 2. **Config file**: TOML file specified by the `NQI_CONFIG` env var
//! 3. **Environment variables**: `NQI__SECTION__FIELD` overrides specific fields
//! 4. **Provider variables**: `QUICKNODE_RPC` and `HELIUS_RPC` append premium providers
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, concurrency)
//! - [`ProvidersConfig`]: premium endpoints and the public fallback
//! - [`SamplingConfig`]: probe counts, pacing, timeouts and the latency floor
//! - [`ScoringConfig`]: sub-score weights and slot-lag penalty
//! - [`SmoothingConfig`]: exponential smoothing of the headline
//! - [`ResponseConfig`]: payload stamps and debug block
//! - [`LoggingConfig`]: log level and format
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_port = 8080
//!
//! [[providers.premium]]
//! name = "Helius"
//! url = "https://mainnet.helius-rpc.com/?api-key=YOUR_KEY"
//!
//! [sampling]
//! samples_per_provider = 5
//! execution_floor_ms = 80
//! ```

use crate::{
    index::{report::ResponseConfig, smoothing::SmoothingConfig},
    upstream::{PremiumProviderEntry, ProvidersConfig, SamplingConfig, ScoringConfig},
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "NQI_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Well-known provider variables, in the order their providers are appended.
pub const WELL_KNOWN_PROVIDER_ENV: [(&str, &str); 2] =
    [("QUICKNODE_RPC", "QuickNode"), ("HELIUS_RPC", "Helius")];

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `3030`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum number of requests served concurrently. Defaults to `64`.
    ///
    /// Each `/api/nqi` request runs a full sampling round, so this also caps outbound
    /// probe traffic.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3030
}

fn default_max_concurrent_requests() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Root application configuration.
///
/// Loaded with the `NQI__` prefix for environment overrides using `__` as a separator, e.g.
/// `NQI__SAMPLING__TIMEOUT_MS=1500`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g., "development", "production"). Defaults to `"development"`.
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub response: ResponseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            server: ServerConfig::default(),
            providers: ProvidersConfig::default(),
            sampling: SamplingConfig::default(),
            scoring: ScoringConfig::default(),
            smoothing: SmoothingConfig::default(),
            response: ResponseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.bind_port", 3030)?
            .set_default("server.max_concurrent_requests", 64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("NQI").separator("__"))
            .build()?;

        let mut config: Self = config_builder.try_deserialize()?;
        config.apply_provider_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from `$NQI_CONFIG`, defaulting to `config/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(&config_path)
    }

    /// Appends premium providers from the well-known provider variables.
    ///
    /// Blank values are ignored. URL validity is checked later when the provider set is
    /// built, where invalid entries are dropped.
    pub fn apply_provider_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, name) in WELL_KNOWN_PROVIDER_ENV {
            let Some(url) = lookup(key).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            if self.providers.premium.iter().any(|p| p.name == name) {
                continue;
            }
            self.providers.premium.push(PremiumProviderEntry { name: name.to_string(), url });
        }
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed into a valid [`SocketAddr`].
    ///
    /// [`SocketAddr`]: std::net::SocketAddr
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Provider URLs are deliberately not checked here: invalid ones are dropped when the
    /// provider set is built.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        self.sampling.validate()?;
        self.scoring.validate()?;
        self.smoothing.validate()?;

        if !self.response.fee_efficiency.is_finite() {
            return Err("Fee efficiency must be a finite number".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
