//! Root endpoint handler.

use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::metrics::{SERVICE_NAME, SERVICE_VERSION};

/// Advertised capabilities. Informational only: the list does not track
/// which optional features actually loaded.
pub const ADVERTISED_FEATURES: [&str; 3] = [
    "Futures market analysis",
    "Signal generation",
    "Integration with fks-app, fks-execution, fks-data",
];

/// Root descriptor response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceDescriptor {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Service status: "running".
    pub status: String,
    /// Well-known endpoint paths by name.
    pub endpoints: BTreeMap<String, String>,
    /// Advertised capabilities, in display order.
    pub features: Vec<String>,
}

impl ServiceDescriptor {
    /// Descriptor built from process constants.
    pub fn current() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
            status: "running".to_string(),
            endpoints: BTreeMap::from([("health".to_string(), "/health".to_string())]),
            features: ADVERTISED_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Root handler - always returns 200 with the service descriptor.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service descriptor", body = ServiceDescriptor)
    ),
    tag = "service"
)]
pub async fn root() -> Json<ServiceDescriptor> {
    Json(ServiceDescriptor::current())
}
