//! HTTP surface for the Network Quality Index.
//!
//! - `GET /api/nqi`: one live snapshot per request (fallback payload on failure)
//! - `GET /health`: liveness
//! - `GET /metrics`: Prometheus exposition

pub mod middleware;
pub mod router;

use axum::{routing::get, Router};
use nqi_core::config::ServerConfig;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

pub use router::AppState;

/// Builds the application router.
#[must_use]
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    let (set_request_id, propagate_request_id) = middleware::create_request_id_layers();
    let (set_request_id_public, propagate_request_id_public) =
        middleware::create_request_id_layers();

    let public = Router::new()
        .route("/health", get(router::handle_health))
        .route("/metrics", get(router::handle_metrics))
        .with_state(state.clone())
        .layer(propagate_request_id_public)
        .layer(set_request_id_public);

    // Each request fans out a full sampling round, so concurrency is capped here.
    let nqi = Router::new()
        .route("/api/nqi", get(router::handle_nqi))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(propagate_request_id)
        .layer(set_request_id);

    public.merge(nqi)
}
