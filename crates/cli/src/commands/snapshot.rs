use nqi_core::{config::AppConfig, index::SnapshotService};
use tracing::debug;

use super::{
    render::{print_json, print_report},
    utils::{print_info, CliError, CliResult},
};

/// Runs one snapshot in-process against the configured providers.
pub async fn run_snapshot(file: &str, json: bool) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;
    config.validate().map_err(CliError::Config)?;
    debug!(path = file, environment = %config.environment, "configuration loaded");

    let service = SnapshotService::from_config(&config)
        .map_err(|e| CliError::Network(e.to_string()))?;

    if !json {
        print_info(&format!(
            "Sampling {} providers ({} probes each)...",
            service.providers().len(),
            config.sampling.samples_per_provider
        ));
    }

    let report = service.snapshot().await;

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    Ok(())
}
