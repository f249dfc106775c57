//! Headline index computation and payload assembly.

pub mod aggregator;
pub mod report;
pub mod service;
pub mod smoothing;

pub use aggregator::{
    AggregateError, AggregateResult, Aggregator, RetryPressure, Stability, Trend, NQI_CEILING,
};
pub use report::{DebugInfo, NqiReport, ReportAssembler, ResponseConfig, RpcRanking};
pub use service::{SnapshotError, SnapshotService};
pub use smoothing::{NqiSmoother, SmoothingConfig};
