//! HTTP API route definitions.

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers::root;
use super::openapi;
use crate::features::FeatureRegistry;

/// Create the API router.
///
/// `/` and the OpenAPI document are always bound; optional features are bound
/// only when the registry holds them as present.
pub fn create_router(features: &FeatureRegistry, cors_origins: &[String]) -> Router {
    let router = Router::new().route("/", get(root));

    features
        .mount(router)
        .merge(openapi::docs_router(openapi::document(features)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

/// Cross-origin policy.
///
/// With no configured origins every origin, method and header is mirrored
/// back and credentials are allowed. A configured list narrows origins only.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        if parsed.is_empty() {
            warn!("CORS_ALLOWED_ORIGINS contains no valid origins, allowing any");
            AllowOrigin::mirror_request()
        } else {
            info!("CORS configured with {} allowed origins", parsed.len());
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
