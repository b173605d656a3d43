//! Prometheus build-info metrics.
//!
//! The registry owns its own recorder instead of installing a global one, so
//! several services (or tests) can live in one process without sharing series.
//! Series are recorded through [`metrics::with_local_recorder`] and rendered
//! from the exporter handle in the Prometheus text exposition format.

use std::sync::Arc;

use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, ServiceError};

/// Build-info gauge metric name.
pub const METRIC_BUILD_INFO: &str = "fks_build_info";

/// Content type of the text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Service name reported by build info and the root descriptor.
pub const SERVICE_NAME: &str = "fks_futures";

/// Service version reported by build info and the root descriptor.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identity of the running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

impl BuildInfo {
    /// Build info of this binary.
    pub fn current() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
        }
    }
}

/// Owned Prometheus registry.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry").finish_non_exhaustive()
    }
}

impl MetricsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        Self {
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Create the registry if the metrics subsystem is enabled.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.metrics_enabled {
            return Err(ServiceError::MetricsUnavailable(
                "disabled by METRICS_ENABLED".to_string(),
            ));
        }

        Ok(Self::new())
    }

    /// Record the build-info gauge with value 1.
    ///
    /// Repeating the call with the same labels leaves the output unchanged.
    pub fn register_build_info(&self, info: &BuildInfo) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            describe_gauge!(METRIC_BUILD_INFO, "Build information for the service");
            gauge!(
                METRIC_BUILD_INFO,
                "service" => info.service.clone(),
                "version" => info.version.clone()
            )
            .set(1.0);
        });

        debug!(
            service = %info.service,
            version = %info.version,
            "Build info registered"
        );
    }

    /// Render every registered series in the text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
