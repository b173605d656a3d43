//! Service composition and startup.
//!
//! [`ServiceBuilder`] collects optional features through a [`FeatureRegistry`];
//! [`Service`] turns the registry into a route table and runs the startup hook
//! that moves the [`Lifecycle`] from `Initializing` to `Ready`.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use strum::{Display, FromRepr};
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, health};
use crate::config::Config;
use crate::error::Result;
use crate::features::{self, FeatureRegistry, OptionalComponent};
use crate::metrics::{BuildInfo, MetricsRegistry};

/// Startup state. `Initializing` moves to `Ready` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum ServiceState {
    /// Route table not yet serving.
    Initializing = 0,
    /// Startup hook has run.
    Ready = 1,
}

/// Shared startup state, readable from handlers.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: Arc<AtomicU8>,
    started_at: Instant,
}

impl Lifecycle {
    /// Create a lifecycle in `Initializing`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ServiceState::Initializing as u8)),
            started_at: Instant::now(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ServiceState {
        ServiceState::from_repr(self.state.load(Ordering::SeqCst))
            .unwrap_or(ServiceState::Initializing)
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.state() == ServiceState::Ready
    }

    /// Move to `Ready`. Returns false if already ready.
    pub fn mark_ready(&self) -> bool {
        self.state
            .compare_exchange(
                ServiceState::Initializing as u8,
                ServiceState::Ready as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Time since the lifecycle was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects optional features before the route table is built.
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    features: FeatureRegistry,
    lifecycle: Lifecycle,
    cors_origins: Vec<String>,
}

impl ServiceBuilder {
    /// Create a builder with no features.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle handed to features that report readiness.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Restrict CORS to these origins. Empty mirrors any origin.
    pub fn cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Load an optional feature. Failure leaves it absent.
    pub fn feature<E, F>(mut self, name: &str, factory: F) -> Self
    where
        F: FnOnce() -> std::result::Result<Router, E>,
        E: std::fmt::Display,
    {
        self.features.load(name, factory);
        self
    }

    /// Load the build-info metrics endpoint.
    pub fn metrics<F>(self, factory: F) -> Self
    where
        F: FnOnce() -> Result<MetricsRegistry>,
    {
        self.feature(features::METRICS, || {
            let registry = factory()?;
            registry.register_build_info(&BuildInfo::current());
            info!("Prometheus metrics with fks_build_info registered");
            Ok::<_, crate::error::ServiceError>(api::metrics::router(registry))
        })
    }

    /// Finish composition.
    pub fn build(self) -> Service {
        Service {
            features: self.features,
            lifecycle: self.lifecycle,
            cors_origins: self.cors_origins,
        }
    }
}

/// The composed HTTP service.
#[derive(Debug)]
pub struct Service {
    features: FeatureRegistry,
    lifecycle: Lifecycle,
    cors_origins: Vec<String>,
}

impl Service {
    /// Start composing a service.
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    /// Compose the service with every built-in optional feature.
    pub fn from_config(config: &Config) -> Self {
        let builder = Self::builder()
            .cors_origins(config.cors_origins())
            .metrics(|| MetricsRegistry::from_config(config));
        let lifecycle = builder.lifecycle();

        builder
            .feature(features::HEALTH, move || {
                features::ensure_enabled(features::HEALTH, config.health_enabled, "HEALTH_ENABLED")?;
                Ok::<_, crate::error::ServiceError>(health::router(lifecycle))
            })
            .build()
    }

    /// Loaded and missing features.
    pub fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    /// Outcome for a single feature.
    pub fn feature(&self, name: &str) -> Option<&OptionalComponent<Router>> {
        self.features.get(name)
    }

    /// Startup state.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Build the route table.
    pub fn router(&self) -> Router {
        api::create_router(&self.features, &self.cors_origins)
    }

    /// Startup hook: log and move to `Ready`.
    pub fn startup(&self) {
        info!("Starting FKS Futures Trading Service...");
        if self.lifecycle.mark_ready() {
            let present = self.features.present();
            let absent: Vec<&str> = self.features.absent().into_iter().map(|(n, _)| n).collect();
            info!(?present, ?absent, "Optional features resolved");
        }
        info!("FKS Futures Trading Service started successfully");
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        self.startup();

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("FKS Futures Trading Service stopped");
        Ok(())
    }
}
