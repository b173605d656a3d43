//! HTTP API: root descriptor, optional health and metrics routes, OpenAPI.

pub mod handlers;
pub mod health;
pub mod metrics;
pub mod openapi;
pub mod routes;

pub use handlers::ServiceDescriptor;
pub use routes::create_router;
