use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::upstream::ProbeError;

/// Maximum number of response-body bytes kept in an [`ProbeError::HttpError`].
const MAX_ERROR_BODY_BYTES: usize = 256;

/// Connection settings for the probe HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// TCP connect timeout. The per-probe timeout still bounds the whole call.
    pub connect_timeout: Duration,
    /// How long idle pooled connections are kept. Sampling reuses the pool across a batch.
    pub pool_idle_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            pool_idle_timeout: Duration::from_secs(30),
            user_agent: concat!("nqi/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Single-shot JSON POST client.
///
/// There are no retries here: a failed call is one failed sample, and retrying would
/// hide exactly the failures the index is meant to measure.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_config(&HttpClientConfig::default())
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: &HttpClientConfig) -> Result<Self, ProbeError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(4)
            .connect_timeout(config.connect_timeout)
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                ProbeError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { client })
    }

    /// Sanitizes network errors so endpoint credentials embedded in URLs never reach logs.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else if error.is_redirect() {
            "unexpected redirect".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Truncates an error body on a char boundary.
    fn truncate_body(raw: String) -> String {
        if raw.len() <= MAX_ERROR_BODY_BYTES {
            return raw;
        }
        let mut end = MAX_ERROR_BODY_BYTES;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &raw[..end])
    }

    /// Sends one JSON POST and returns the raw response body.
    ///
    /// `timeout` bounds the entire exchange: connect, send, and reading the body.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::Timeout`] if the call does not complete within `timeout`
    /// - [`ProbeError::HttpError`] for non-success HTTP status codes
    /// - [`ProbeError::ConnectionFailed`] for network-related failures
    pub async fn send_request(
        &self,
        url: &str,
        body: bytes::Bytes,
        timeout: Duration,
    ) -> Result<bytes::Bytes, ProbeError> {
        let exchange = async {
            let response = self
                .client
                .post(url)
                .header("content-type", "application/json")
                .body(body)
                .send()
                .await
                .map_err(|e| ProbeError::ConnectionFailed(Self::sanitize_network_error(&e)))?;

            let status = response.status();
            if !status.is_success() {
                let raw_text = response.text().await.unwrap_or_default();
                tracing::trace!(status = status.as_u16(), "http request failed");
                return Err(ProbeError::HttpError(status.as_u16(), Self::truncate_body(raw_text)));
            }

            response
                .bytes()
                .await
                .map_err(|e| ProbeError::ConnectionFailed(Self::sanitize_network_error(&e)))
        };

        tokio::time::timeout(timeout, exchange).await.map_err(|_| ProbeError::Timeout)?
    }
}
