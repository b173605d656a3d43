//! FKS futures trading service.
//!
//! Process skeleton for the futures service: an HTTP server that always
//! serves its root descriptor, mounts optional features (health checks,
//! build-info metrics) when they load, and keeps starting when they do not.
//!
//! ```text
//! config ─► logging ─► FeatureRegistry ─► Service::router ─► startup ─► serve
//!                      (metrics, health)    (/, /openapi.json, present features)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`features`]: Optional feature loader and registry
//! - [`metrics`]: Build-info Prometheus registry
//! - [`service`]: Service composition and startup lifecycle
//! - [`api`]: HTTP routes, CORS and OpenAPI
//! - [`logging`]: Log line format and subscriber setup
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod metrics;
pub mod service;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
pub use service::{Service, ServiceBuilder};
