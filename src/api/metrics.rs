//! `/metrics` route.
//!
//! Not annotated for OpenAPI, so it never appears in the generated document.

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};

use crate::metrics::{MetricsRegistry, PROMETHEUS_CONTENT_TYPE};

/// Render the registry in the text exposition format.
pub async fn metrics(State(registry): State<MetricsRegistry>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], registry.render())
}

/// Route set mounted when the metrics subsystem loads.
pub fn router(registry: MetricsRegistry) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .with_state(registry)
}
