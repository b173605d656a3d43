//! Health-check routes, mounted as an optional feature.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::metrics::{SERVICE_NAME, SERVICE_VERSION};
use crate::service::Lifecycle;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "healthy".
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Response time, RFC 3339.
    pub timestamp: String,
    /// Seconds since the process started composing the service.
    pub uptime_seconds: u64,
}

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveResponse {
    /// Status: "alive".
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether startup has completed.
    pub ready: bool,
    /// Lifecycle state name.
    pub state: String,
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "health"
)]
pub async fn health(State(lifecycle): State<Lifecycle>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: lifecycle.uptime().as_secs(),
    })
}

/// Liveness handler - returns 200 while the process serves requests.
#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Process is alive", body = LiveResponse)),
    tag = "health"
)]
pub async fn live() -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "alive".to_string(),
    })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Startup complete", body = ReadyResponse),
        (status = 503, description = "Still initializing", body = ReadyResponse)
    ),
    tag = "health"
)]
pub async fn ready(State(lifecycle): State<Lifecycle>) -> impl IntoResponse {
    let state = lifecycle.state();
    let response = ReadyResponse {
        ready: lifecycle.is_ready(),
        state: state.to_string(),
    };

    if response.ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Route set mounted when the health feature loads.
pub fn router(lifecycle: Lifecycle) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
        .with_state(lifecycle)
}
