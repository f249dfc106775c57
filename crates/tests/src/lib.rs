//! Integration tests for the Solana Network Quality Index
//!
//! - `probe_tests`: the HTTP probe against mockito servers and silent sockets
//! - `snapshot_tests`: sampling, aggregation and the fallback path over real HTTP
//! - `server_tests`: the axum router backed by mocked providers
//! - `mock_infrastructure`: reusable mocks and fixtures
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod probe_tests;

#[cfg(test)]
mod snapshot_tests;

#[cfg(test)]
mod server_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
