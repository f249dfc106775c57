//! JSON-RPC 2.0 wire types and the Solana methods used for probing.
//!
//! Only the envelope is modelled. `result` values are carried as opaque
//! [`serde_json::Value`]s: the sampler inspects nothing beyond the slot number
//! returned by `getSlot`.

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for the JSON-RPC version.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// Request id sent with every probe. Responses are never correlated by id.
pub const PROBE_REQUEST_ID: u64 = 1;

/// JSON-RPC 2.0 request structure.
///
/// # Example
///
/// ```
/// use nqi_core::types::JsonRpcRequest;
/// use serde_json::json;
///
/// let request = JsonRpcRequest::new("getSlot", json!([{ "commitment": "confirmed" }]));
/// assert_eq!(request.method, "getSlot");
/// assert_eq!(request.id, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    /// Creates a probe request with the fixed probe id.
    #[must_use]
    pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, id: PROBE_REQUEST_ID, method: method.into(), params }
    }
}

/// JSON-RPC 2.0 response envelope.
///
/// A response carries either a `result` or an `error`. Providers are not trusted to
/// follow that rule, so both are optional and `error` wins when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: Cow<'static, str>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: serde_json::Value,
}

fn default_jsonrpc() -> Cow<'static, str> {
    JSONRPC_VERSION_COW
}

/// JSON-RPC error object.
///
/// Both fields are optional: some providers return bare `{"error": {}}` or a string-only
/// message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Solana RPC methods issued by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    /// Heavier call, used on even sample indices.
    GetLatestBlockhash,
    /// Lighter call, used on odd sample indices. Returns the current slot.
    GetSlot,
}

impl RpcMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GetLatestBlockhash => "getLatestBlockhash",
            Self::GetSlot => "getSlot",
        }
    }

    /// Method for the `index`-th sample of a batch, alternating by parity.
    #[must_use]
    pub const fn for_sample(index: usize) -> Self {
        if index % 2 == 0 {
            Self::GetLatestBlockhash
        } else {
            Self::GetSlot
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the `[{"commitment": ...}]` params array shared by both probe methods.
#[must_use]
pub fn commitment_params(commitment: &str) -> serde_json::Value {
    serde_json::json!([{ "commitment": commitment }])
}
