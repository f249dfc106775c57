//! Provider probing and per-provider scoring.
//!
//! - [`probe`]: one JSON-RPC call with a hard timeout ([`RpcProbe`], [`HttpProbe`])
//! - [`sampler`]: a paced batch of probes against one provider, reduced to a
//!   [`ProviderSummary`]
//! - [`scoring`]: pure curves mapping latency, jitter, failure rate and slot lag to scores
//! - [`provider`]: the ordered provider list built from configuration
//!
//! Probe failures never propagate past the sampler. Timeouts, HTTP errors and JSON-RPC
//! error envelopes all count as one failed sample; [`ProbeFailureKind`] only labels them
//! for logs and metrics.

pub mod errors;
pub mod http_client;
pub mod probe;
pub mod provider;
pub mod sampler;
pub mod scoring;

pub use errors::{ProbeError, ProbeFailureKind};
pub use http_client::{HttpClient, HttpClientConfig};
pub use probe::{HttpProbe, RpcProbe};
pub use provider::{
    PremiumProviderEntry, ProviderConfig, ProviderSet, ProviderTier, ProvidersConfig,
    DEFAULT_PUBLIC_RPC_NAME, DEFAULT_PUBLIC_RPC_URL,
};
pub use sampler::{ProviderSampler, ProviderSummary, SamplingConfig};
pub use scoring::{
    failure_score, jitter_score, latency_score, ScoringConfig, ScoringWeights,
};
