//! # NQI Core
//!
//! Sampling and scoring engine behind the Solana Network Quality Index (NQI).
//!
//! This crate provides:
//!
//! - **[`upstream`]**: JSON-RPC probing of provider endpoints, per-provider batch sampling, and
//!   the pure scoring curves that turn latency, jitter, failures and slot lag into health.
//!
//! - **[`index`]**: Aggregation of provider summaries into the headline index, exponential
//!   smoothing across snapshots, and assembly of the payload served to dashboards.
//!
//! - **[`config`]**: Layered configuration (defaults, TOML, environment).
//!
//! - **[`metrics`]**: Prometheus metrics for probes and snapshots.
//!
//! ## Snapshot Flow
//!
//! ```text
//! SnapshotService::snapshot()
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Aggregator  │──── fan-out (concurrent) ────┐
//! └──────┬───────┘                              │
//!        │                         ┌────────────▼───────────┐
//!        │                         │ ProviderSampler × N     │
//!        │                         │  warm-up + 7 probes     │
//!        │                         │  (sequential, 120ms gap)│
//!        │                         └────────────┬───────────┘
//!        │ ◄──────── ProviderSummary ───────────┘
//!        ▼
//!  slot-lag penalties → premium-weighted headline → stability penalty
//!        │
//!        ▼
//!  clamp [0, 98] → EMA smoothing → ReportAssembler → NqiReport (JSON)
//! ```
//!
//! Any failure along this path, including a total upstream outage, degrades to
//! [`index::NqiReport::fallback`] instead of surfacing an error.

pub mod config;
pub mod index;
pub mod metrics;
pub mod stats;
pub mod types;
pub mod upstream;
