use nqi_core::index::NqiReport;
use prettytable::{row, Table};

/// Builds the provider ranking table.
pub fn rankings_table(report: &NqiReport) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Provider", "Health", "Latency", "Error %", "Trend"]);

    for ranking in &report.rpc_rankings {
        table.add_row(row![
            ranking.name,
            ranking.health,
            format!("{} ms", ranking.latency_ms),
            format!("{:.1}", ranking.error_rate),
            ranking.trend
        ]);
    }

    table
}

/// Prints the headline lines followed by the ranking table.
pub fn print_report(report: &NqiReport) {
    println!("Network Quality Index: {:.1}", report.nqi);
    if let Some(raw) = report.nqi_raw {
        println!("  Raw: {raw:.1}");
    }
    println!("  Success Rate: {:.1}%", report.success_rate);
    println!("  Latency Stability: {}", report.latency_stability);
    println!("  Retry Pressure: {}", report.retry_pressure);
    println!("  Fee Efficiency: {}", report.fee_efficiency);
    if report.is_fallback() {
        println!("  Source: fallback ({}s old)", report.updated_seconds_ago);
    }
    println!("  {}", report.context);
    println!();

    rankings_table(report).printstd();
}

/// Prints the payload as pretty JSON.
pub fn print_json(report: &NqiReport) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
