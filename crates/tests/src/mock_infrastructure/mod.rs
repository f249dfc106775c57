//! Mock infrastructure for testing the NQI engine
//!
//! Reusable mock types for exercising the HTTP probe and the full snapshot path without
//! real Solana endpoints.
//!
//! ## Components
//!
//! - `RpcMockBuilder`: wraps mockito with Solana-specific JSON-RPC mocking
//! - `SilentEndpoint`: accepts connections and never answers (probe timeout path)
//! - Fixtures and fast sampling configs
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::RpcMockBuilder;
//!
//! let mut mock = RpcMockBuilder::new().await;
//! mock.mock_healthy(250_000_000);
//!
//! // Use mock.url() as a provider endpoint
//! ```

pub mod rpc_mock;
pub mod test_helpers;

pub use rpc_mock::RpcMockBuilder;
pub use test_helpers::*;
