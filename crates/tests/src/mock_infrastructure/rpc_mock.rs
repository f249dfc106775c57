//! Solana JSON-RPC mock server.
//!
//! Wraps mockito with builders for the two probe methods and the failure shapes a provider
//! can return.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

use super::test_helpers::latest_blockhash_result;

/// Builder for a mock Solana RPC endpoint.
pub struct RpcMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl RpcMockBuilder {
    /// Creates a new builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    fn method_matcher(method: &str) -> Matcher {
        Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#))
    }

    fn mock_result(&mut self, method: &str, result: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(Self::method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string())
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks `getSlot` returning `slot`.
    pub fn mock_get_slot(&mut self, slot: u64) -> &mut Self {
        self.mock_result("getSlot", &json!(slot))
    }

    /// Mocks `getLatestBlockhash` with the slot in its response context.
    pub fn mock_latest_blockhash(&mut self, slot: u64) -> &mut Self {
        self.mock_result("getLatestBlockhash", &latest_blockhash_result(slot))
    }

    /// Mocks both probe methods as a healthy node at `slot`.
    pub fn mock_healthy(&mut self, slot: u64) -> &mut Self {
        self.mock_get_slot(slot).mock_latest_blockhash(slot)
    }

    /// Mocks a JSON-RPC error envelope for `method`.
    pub fn mock_rpc_error(&mut self, method: &str, code: i64, message: &str) -> &mut Self {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": code, "message": message }
        });
        self.mock_raw(method, 200, &body.to_string())
    }

    /// Mocks an error envelope that carries neither code nor message.
    pub fn mock_rpc_error_without_message(&mut self, method: &str) -> &mut Self {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "error": {} });
        self.mock_raw(method, 200, &body.to_string())
    }

    /// Mocks a 200 response whose body is not a JSON-RPC envelope.
    pub fn mock_malformed(&mut self, method: &str) -> &mut Self {
        self.mock_raw(method, 200, "<html>maintenance</html>")
    }

    /// Mocks an HTTP error status for `method`.
    pub fn mock_http_status(&mut self, method: &str, status: usize) -> &mut Self {
        self.mock_raw(method, status, "upstream unavailable")
    }

    /// Mocks a server error (500) for every request.
    pub fn mock_server_error(&mut self) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .with_status(500)
            .with_body("Internal Server Error")
            .create();

        self.mocks.push(mock);
        self
    }

    fn mock_raw(&mut self, method: &str, status: usize, body: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Self::method_matcher(method))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Number of mocks registered.
    #[must_use]
    pub fn mock_count(&self) -> usize {
        self.mocks.len()
    }
}
