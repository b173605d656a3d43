//! OpenAPI document for the JSON endpoints.
//!
//! `/metrics` is deliberately left out. Health paths are dropped from the
//! served document when the health feature did not load.

use std::sync::Arc;

use axum::{extract::State, Json, Router};
use utoipa::openapi::OpenApi as OpenApiDocument;
use utoipa::OpenApi;

use super::handlers::{self, ServiceDescriptor};
use super::health::{self, HealthResponse, LiveResponse, ReadyResponse};
use crate::features::{FeatureRegistry, HEALTH};

/// Path the OpenAPI JSON is served from.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Service API documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FKS Futures Trading Service",
        description = "Futures market analysis and signal generation for CME Group futures contracts"
    ),
    paths(handlers::root, health::health, health::live, health::ready),
    components(schemas(ServiceDescriptor, HealthResponse, LiveResponse, ReadyResponse)),
    tags(
        (name = "service", description = "Service descriptor"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;

/// Document matching the features that actually loaded.
pub fn document(features: &FeatureRegistry) -> OpenApiDocument {
    let mut doc = ApiDoc::openapi();
    if !features.is_present(HEALTH) {
        doc.paths.paths.retain(|path, _| !path.starts_with("/health"));
    }
    doc
}

/// Serve the document as JSON.
pub async fn openapi_json(State(doc): State<Arc<OpenApiDocument>>) -> Json<OpenApiDocument> {
    Json(doc.as_ref().clone())
}

/// Routes serving the document (and Swagger UI when built with `swagger-ui`).
pub fn docs_router(doc: OpenApiDocument) -> Router {
    #[cfg(feature = "swagger-ui")]
    {
        utoipa_swagger_ui::SwaggerUi::new("/docs")
            .url(OPENAPI_PATH, doc)
            .into()
    }

    #[cfg(not(feature = "swagger-ui"))]
    {
        Router::new()
            .route(OPENAPI_PATH, axum::routing::get(openapi_json))
            .with_state(Arc::new(doc))
    }
}
