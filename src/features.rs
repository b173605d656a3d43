//! Optional feature loading.
//!
//! Every optional sub-feature enters the service through [`load`]: the
//! factory runs once during startup and its outcome is frozen as an
//! [`OptionalComponent`]. A factory that errors or panics produces
//! [`OptionalComponent::Absent`] and a single warning; it never aborts startup.
//!
//! [`FeatureRegistry`] holds the outcome for each named feature and is the
//! only place routes for optional features are merged into the service.

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use axum::Router;
use tracing::{debug, warn};

use crate::error::ServiceError;

/// Health-check routes.
pub const HEALTH: &str = "health";
/// Build-info metrics endpoint.
pub const METRICS: &str = "metrics";

/// A capability that either loaded or did not.
#[derive(Debug, Clone)]
pub enum OptionalComponent<T> {
    /// Loaded successfully.
    Present(T),
    /// Failed to load; holds the reason.
    Absent(String),
}

impl<T> OptionalComponent<T> {
    /// Whether the component loaded.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Borrow the loaded handler.
    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(handler) => Some(handler),
            Self::Absent(_) => None,
        }
    }

    /// Reason the component is absent.
    pub fn absent_reason(&self) -> Option<&str> {
        match self {
            Self::Present(_) => None,
            Self::Absent(reason) => Some(reason.as_str()),
        }
    }
}

/// Acquire an optional feature, converting any failure into `Absent`.
pub fn load<T, E, F>(name: &str, factory: F) -> OptionalComponent<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    match panic::catch_unwind(AssertUnwindSafe(factory)) {
        Ok(Ok(handler)) => {
            debug!(feature = name, "Optional feature loaded");
            OptionalComponent::Present(handler)
        }
        Ok(Err(e)) => absent(name, e.to_string()),
        Err(payload) => absent(name, panic_message(payload.as_ref())),
    }
}

fn absent<T>(name: &str, reason: String) -> OptionalComponent<T> {
    warn!("Could not load {} feature: {}", name, reason);
    OptionalComponent::Absent(reason)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked during construction".to_string()
    }
}

/// Fail a feature factory when its config toggle is off.
pub fn ensure_enabled(feature: &str, enabled: bool, toggle: &str) -> Result<(), ServiceError> {
    if enabled {
        Ok(())
    } else {
        Err(ServiceError::FeatureUnavailable {
            feature: feature.to_string(),
            reason: format!("disabled by {toggle}"),
        })
    }
}

/// Name to route-set map, populated once at startup.
#[derive(Debug, Default, Clone)]
pub struct FeatureRegistry {
    components: Vec<(String, OptionalComponent<Router>)>,
}

impl FeatureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a feature and record its outcome under `name`.
    ///
    /// Loading the same name twice replaces the earlier outcome.
    pub fn load<E, F>(&mut self, name: &str, factory: F) -> &OptionalComponent<Router>
    where
        F: FnOnce() -> Result<Router, E>,
        E: Display,
    {
        let component = load(name, factory);
        let index = match self.components.iter().position(|(n, _)| n == name) {
            Some(i) => {
                self.components[i].1 = component;
                i
            }
            None => {
                self.components.push((name.to_string(), component));
                self.components.len() - 1
            }
        };
        &self.components[index].1
    }

    /// Outcome recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&OptionalComponent<Router>> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Whether `name` loaded.
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(OptionalComponent::is_present)
    }

    /// Names of loaded features, in load order.
    pub fn present(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter(|(_, c)| c.is_present())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Names and reasons of features that failed to load, in load order.
    pub fn absent(&self) -> Vec<(&str, &str)> {
        self.components
            .iter()
            .filter_map(|(n, c)| c.absent_reason().map(|r| (n.as_str(), r)))
            .collect()
    }

    /// Merge the routes of every present feature into `router`.
    pub fn mount(&self, router: Router) -> Router {
        self.components
            .iter()
            .filter_map(|(_, c)| c.present())
            .fold(router, |router, routes| router.merge(routes.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture_logs;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn ping_router() -> Router {
        Router::new().route("/ping", get(|| async { "pong" }))
    }

    #[test]
    fn successful_factory_is_present() {
        let component = load("ping", || Ok::<_, ServiceError>(42));

        assert!(component.is_present());
        assert_eq!(component.present(), Some(&42));
        assert_eq!(component.absent_reason(), None);
    }

    #[test]
    fn failing_factory_is_absent_with_reason() {
        let component: OptionalComponent<u8> =
            load("signals", || Err("module not installed"));

        assert!(!component.is_present());
        assert_eq!(component.absent_reason(), Some("module not installed"));
    }

    #[test]
    fn panicking_factory_is_absent() {
        let component: OptionalComponent<u8> =
            load("signals", || -> Result<u8, String> { panic!("missing symbol") });

        assert_eq!(component.absent_reason(), Some("panicked: missing symbol"));
    }

    #[test]
    fn absence_logs_exactly_one_warning_naming_the_feature() {
        let logs = capture_logs(|| {
            let mut registry = FeatureRegistry::new();
            registry.load(HEALTH, || -> Result<Router, String> { panic!("broken import") });
            registry.load(METRICS, || Ok::<_, String>(ping_router()));
        });

        let warnings: Vec<&str> = logs.lines().filter(|l| l.contains(" - WARNING - ")).collect();
        assert_eq!(warnings.len(), 1, "logs were:\n{logs}");
        assert!(warnings[0].contains("health"));
    }

    #[test]
    fn ensure_enabled_reports_toggle() {
        assert!(ensure_enabled(HEALTH, true, "HEALTH_ENABLED").is_ok());

        let err = ensure_enabled(HEALTH, false, "HEALTH_ENABLED").unwrap_err();
        assert_eq!(
            err.to_string(),
            "feature health unavailable: disabled by HEALTH_ENABLED"
        );
    }

    #[test]
    fn registry_is_introspectable() {
        let mut registry = FeatureRegistry::new();
        registry.load(HEALTH, || Ok::<_, String>(ping_router()));
        registry.load(METRICS, || Err::<Router, _>("exporter missing"));

        assert!(registry.is_present(HEALTH));
        assert!(!registry.is_present(METRICS));
        assert!(!registry.is_present("signals"));
        assert_eq!(registry.present(), vec![HEALTH]);
        assert_eq!(registry.absent(), vec![(METRICS, "exporter missing")]);
    }

    #[test]
    fn reloading_a_name_replaces_outcome() {
        let mut registry = FeatureRegistry::new();
        registry.load(HEALTH, || Err::<Router, _>("first attempt"));
        let outcome = registry.load(HEALTH, || Ok::<_, String>(ping_router()));

        assert!(outcome.is_present());
        assert_eq!(registry.present(), vec![HEALTH]);
        assert!(registry.absent().is_empty());
    }

    #[tokio::test]
    async fn mount_binds_only_present_features() {
        let mut registry = FeatureRegistry::new();
        registry.load("ping", || Ok::<_, String>(ping_router()));
        registry.load("pong", || -> Result<Router, String> {
            Ok(Router::new().route("/pong", get(|| async { "ping" })))
        });
        registry.load("broken", || -> Result<Router, String> { panic!("boom") });

        let app = registry.mount(Router::new());

        for (uri, expected) in [
            ("/ping", StatusCode::OK),
            ("/pong", StatusCode::OK),
            ("/broken", StatusCode::NOT_FOUND),
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{uri}");
        }
    }
}
