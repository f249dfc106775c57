use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use nqi_core::{index::SnapshotService, metrics::MetricsCollector};
use std::sync::Arc;
use tracing::{info, Instrument};

use crate::middleware::CorrelationId;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SnapshotService>,
    pub metrics: MetricsCollector,
}

impl AppState {
    #[must_use]
    pub fn new(service: Arc<SnapshotService>, metrics: MetricsCollector) -> Self {
        Self { service, metrics }
    }
}

/// Serves one fresh snapshot.
///
/// Always `200 OK`: failures degrade to the fallback payload inside the service.
pub async fn handle_nqi(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let request_id = CorrelationId::from_headers(&headers)
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let span = tracing::info_span!("snapshot", request_id = %request_id);

    let report = state.service.snapshot().instrument(span.clone()).await;
    span.in_scope(|| {
        info!(nqi = report.nqi, fallback = report.is_fallback(), "snapshot served");
    });

    (StatusCode::OK, [(header::CACHE_CONTROL, "no-store")], Json(report))
}

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}

/// Liveness. Probing happens per request, so there is no upstream state to report.
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let health_status = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.service.providers().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (StatusCode::OK, Json(health_status))
}
