//! Single timed JSON-RPC call against one provider endpoint.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

use super::{errors::ProbeError, http_client::HttpClient};
use crate::types::{JsonRpcRequest, JsonRpcResponse};

/// Message used when a provider returns an `error` envelope without one.
pub const DEFAULT_RPC_ERROR_MESSAGE: &str = "RPC error";

/// One JSON-RPC call with no retries.
///
/// Returns the `result` field verbatim on success. Implementations must not retry: the
/// sampler counts each call as exactly one sample.
#[async_trait]
pub trait RpcProbe: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ProbeError`] on timeout, transport failure, or a JSON-RPC error envelope.
    async fn call(&self, endpoint_url: &str, method: &str, params: Value)
        -> Result<Value, ProbeError>;
}

/// [`RpcProbe`] over HTTP with a hard per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: HttpClient,
    timeout: Duration,
}

impl HttpProbe {
    #[must_use]
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Extracts `result` from a JSON-RPC response body.
    ///
    /// # Errors
    ///
    /// [`ProbeError::RpcError`] when the envelope carries `error`, and
    /// [`ProbeError::InvalidResponse`] when the body is not a JSON-RPC envelope.
    pub fn parse_response(body: &[u8]) -> Result<Value, ProbeError> {
        let response: JsonRpcResponse = serde_json::from_slice(body)
            .map_err(|e| ProbeError::InvalidResponse(format!("Invalid JSON: {e}")))?;

        if let Some(error) = response.error {
            let message = error
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_RPC_ERROR_MESSAGE.to_string());
            return Err(ProbeError::RpcError(error.code.unwrap_or(0), message));
        }

        // `null` is a legitimate result for some methods, so a missing field maps to it too.
        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl RpcProbe for HttpProbe {
    async fn call(
        &self,
        endpoint_url: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, ProbeError> {
        let request = JsonRpcRequest::new(method, params);
        let body = serde_json::to_vec(&request)
            .map_err(|e| ProbeError::InvalidRequest(format!("serialize: {e}")))?;

        let response =
            self.client.send_request(endpoint_url, bytes::Bytes::from(body), self.timeout).await?;

        trace!(method = method, bytes = response.len(), "probe response received");
        Self::parse_response(&response)
    }
}
