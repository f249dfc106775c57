use anyhow::Result;
use axum::serve;
use nqi_core::{config::AppConfig, index::SnapshotService, metrics::MetricsCollector};
use server::{create_app, AppState};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter raising the workspace crates to `level` while keeping dependencies at `warn`.
fn crate_directive(level: &str) -> String {
    format!("warn,nqi_core={level},server={level},cli={level}")
}

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG=debug` and `RUST_LOG=trace` raise the workspace crates only; any other
/// `RUST_LOG` value is used as a full filter directive.
fn init_logging(config: &AppConfig) {
    let filter = match std::env::var("RUST_LOG").as_deref() {
        Ok(level @ ("debug" | "trace")) => EnvFilter::new(crate_directive(level)),
        Ok(_) => EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| EnvFilter::new(crate_directive("debug"))),
        Err(_) => EnvFilter::new(crate_directive(&config.logging.level)),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration load failed: {e}"))?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!("Starting NQI server");

    let service = Arc::new(
        SnapshotService::from_config(&config)
            .map_err(|e| anyhow::anyhow!("Snapshot service initialization failed: {e}"))?,
    );
    debug!(
        providers = service.providers().len(),
        premium = service.providers().premium_count(),
        samples_per_provider = config.sampling.samples_per_provider,
        bind_port = config.server.bind_port,
        "Configuration loaded"
    );

    let state = AppState::new(service, MetricsCollector::new());
    let app = create_app(state, &config.server);

    let addr: SocketAddr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "NQI server listening");

    if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight snapshots");
}
