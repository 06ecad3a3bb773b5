//! Health Routes
//!
//! - GET / - Service banner
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Per-service status, 503 when anything is down

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, RootResponse, ServicesHealth};
use crate::api::state::AppState;

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: "Koru API is running".to_string(),
    })
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Checks the store and the extraction backend.
pub async fn full_health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let storage = match state.store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let extractor = match state.extractor.health_check().await {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let services = ServicesHealth {
        api: "ok".to_string(),
        storage,
        extractor,
    };

    let (status, label) = if services.all_ok() {
        (StatusCode::OK, "healthy")
    } else {
        tracing::warn!(
            storage = %services.storage,
            extractor = %services.extractor,
            "Health check degraded"
        );
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            services,
            uptime_seconds: state.uptime_seconds(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
