//! Test Helper Functions and Utilities
//!
//! Fixtures for Solana RPC responses, fast sampling configs and an endpoint that never
//! answers.

use nqi_core::{
    config::AppConfig,
    upstream::{HttpClient, HttpProbe, PremiumProviderEntry},
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;

/// Creates a `getLatestBlockhash` result at `slot`.
#[must_use]
pub fn latest_blockhash_result(slot: u64) -> Value {
    json!({
        "context": { "apiVersion": "2.0.15", "slot": slot },
        "value": {
            "blockhash": format!("{slot:0>44}"),
            "lastValidBlockHeight": slot.saturating_sub(1_000) + 150
        }
    })
}

/// Config with no pacing and no warm-up so integration runs stay short.
#[must_use]
pub fn fast_config(samples_per_provider: usize, timeout_ms: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.sampling.samples_per_provider = samples_per_provider;
    config.sampling.sleep_ms = 0;
    config.sampling.timeout_ms = timeout_ms;
    config.sampling.warmup = false;
    config
}

/// Points the config at the given premium endpoints and public endpoint.
pub fn with_providers(config: &mut AppConfig, premium: &[(&str, String)], public_url: String) {
    config.providers.premium = premium
        .iter()
        .map(|(name, url)| PremiumProviderEntry { name: (*name).to_string(), url: url.clone() })
        .collect();
    config.providers.public_url = public_url;
}

/// Creates an HTTP probe with the given per-call timeout.
#[must_use]
pub fn http_probe(timeout: Duration) -> HttpProbe {
    HttpProbe::new(HttpClient::new().unwrap(), timeout)
}

/// An endpoint that accepts TCP connections but never writes a response.
pub struct SilentEndpoint {
    _listener: TcpListener,
    url: String,
}

impl SilentEndpoint {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        Self { _listener: listener, url }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// An endpoint with nothing listening, for connection-refused paths.
pub async fn closed_endpoint_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_blockhash_result_carries_slot() {
        let result = latest_blockhash_result(250_000_000);
        assert_eq!(result["context"]["slot"], 250_000_000);
        assert_eq!(result["value"]["blockhash"].as_str().unwrap().len(), 44);
    }

    #[test]
    fn test_fast_config_validates() {
        let config = fast_config(3, 500);
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling.sleep_ms, 0);
        assert!(!config.sampling.warmup);
    }
}
