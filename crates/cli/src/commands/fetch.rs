use nqi_core::index::NqiReport;
use std::time::Duration;

use super::{
    render::{print_json, print_report},
    utils::{print_error, CliError, CliResult},
};

/// Resolves the payload URL from a server base URL or a full `/api/nqi` URL.
pub fn nqi_endpoint(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/api/nqi") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/api/nqi")
    }
}

/// Fetches the current payload from a running server.
pub async fn fetch_report(base: &str, timeout_secs: u64) -> CliResult<NqiReport> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    let response = client.get(nqi_endpoint(base)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Server(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn run_fetch(base: &str, timeout_secs: u64, json: bool) -> CliResult<()> {
    let report = match fetch_report(base, timeout_secs).await {
        Ok(report) => report,
        Err(e) => {
            print_error(&format!("Failed to fetch {}", nqi_endpoint(base)));
            return Err(e);
        }
    };

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    Ok(())
}
