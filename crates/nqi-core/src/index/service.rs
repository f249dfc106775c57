//! Snapshot entry point used by the HTTP server and the CLI.

use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, warn};

use super::{
    aggregator::{AggregateError, Aggregator},
    report::{NqiReport, ReportAssembler},
    smoothing::NqiSmoother,
};
use crate::{
    config::AppConfig,
    metrics::{self, SnapshotOutcome},
    upstream::{
        HttpClient, HttpProbe, ProbeError, ProviderSampler, ProviderSet, RpcProbe,
    },
};

/// Reasons a snapshot could not be served live.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("snapshot exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("snapshot panicked")]
    Panicked,
}

/// Produces one [`NqiReport`] per call.
///
/// Holds the provider list, the aggregator (and through it the smoothing state) and the
/// report assembler. Share it behind an `Arc`; snapshots may run concurrently.
pub struct SnapshotService {
    aggregator: Aggregator,
    providers: ProviderSet,
    assembler: ReportAssembler,
    deadline: Option<Duration>,
}

impl SnapshotService {
    /// Builds the service with the HTTP probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProbeError> {
        let client = HttpClient::new()?;
        let probe = HttpProbe::new(client, config.sampling.timeout());
        Ok(Self::with_probe(config, Arc::new(probe)))
    }

    /// Builds the service around any [`RpcProbe`].
    #[must_use]
    pub fn with_probe(config: &AppConfig, probe: Arc<dyn RpcProbe>) -> Self {
        let providers = ProviderSet::from_config(&config.providers);
        Self::with_providers(config, probe, providers)
    }

    /// Builds the service around an explicit provider list.
    #[must_use]
    pub fn with_providers(
        config: &AppConfig,
        probe: Arc<dyn RpcProbe>,
        providers: ProviderSet,
    ) -> Self {
        let sampler =
            ProviderSampler::new(probe, config.sampling.clone(), config.scoring.clone());
        let aggregator = Aggregator::new(sampler, NqiSmoother::new(config.smoothing.clone()));
        let assembler = ReportAssembler::new(
            config.response.clone(),
            config.sampling.clone(),
            config.smoothing.alpha,
        );

        Self { aggregator, providers, assembler, deadline: config.sampling.overall_deadline() }
    }

    #[must_use]
    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    #[must_use]
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Runs one live snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if aggregation fails or the configured deadline expires.
    pub async fn try_snapshot(&self) -> Result<NqiReport, SnapshotError> {
        let aggregate = self.aggregator.aggregate(&self.providers);
        let result = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, aggregate)
                .await
                .map_err(|_| SnapshotError::DeadlineExceeded(deadline))??,
            None => aggregate.await?,
        };

        metrics::record_aggregate(&result);
        Ok(self.assembler.assemble(&result))
    }

    /// Runs one snapshot, degrading to [`NqiReport::fallback`] on any failure, panics
    /// included.
    pub async fn snapshot(&self) -> NqiReport {
        let outcome = AssertUnwindSafe(self.try_snapshot()).catch_unwind().await;

        let report = match outcome {
            Ok(Ok(report)) => {
                metrics::record_snapshot(SnapshotOutcome::Live, &report);
                return report;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "live snapshot unavailable, serving fallback");
                NqiReport::fallback()
            }
            Err(_) => {
                error!(error = %SnapshotError::Panicked, "serving fallback");
                NqiReport::fallback()
            }
        };

        metrics::record_snapshot(SnapshotOutcome::Fallback, &report);
        report
    }
}
