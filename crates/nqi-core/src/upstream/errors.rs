use thiserror::Error;

/// Failure taxonomy for a single probe.
///
/// The sampler records every kind identically as one failed sample; the kind only
/// exists for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeFailureKind {
    /// No response within the per-call timeout.
    Timeout,
    /// Non-success HTTP status, connection failure, or unreadable body.
    Transport,
    /// JSON-RPC `error` envelope or malformed JSON-RPC payload.
    Protocol,
}

impl ProbeFailureKind {
    /// Returns a static string representation for metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Protocol => "protocol",
        }
    }
}

/// Errors that can occur when probing a provider endpoint.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProbeError {
    /// No response arrived before the probe timeout.
    #[error("Request timeout")]
    Timeout,

    /// Failed to establish a connection or transfer the request/response.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error occurred (non-2xx status code).
    ///
    /// First field is the HTTP status code, second is the (truncated) body.
    #[error("HTTP error: {0}")]
    HttpError(u16, String),

    /// JSON-RPC error returned by the provider.
    ///
    /// First field is the RPC error code (`0` when absent), second is the message.
    #[error("RPC error: {1}")]
    RpcError(i64, String),

    /// Response body was not a JSON-RPC envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The probe request could not be built or serialized.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProbeError {
    /// Maps the error onto the probe failure taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ProbeFailureKind {
        match self {
            Self::Timeout => ProbeFailureKind::Timeout,
            Self::ConnectionFailed(_) | Self::HttpError(..) | Self::InvalidRequest(_) => {
                ProbeFailureKind::Transport
            }
            Self::RpcError(..) | Self::InvalidResponse(_) => ProbeFailureKind::Protocol,
        }
    }
}
