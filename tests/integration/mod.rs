//! Integration tests for the futures service.
//!
//! Each test binds the service on a loopback port, serves it in the
//! background and talks to it over real HTTP.
//! Run with: cargo test --test integration

use std::net::SocketAddr;

use axum::Router;
use fks_futures::config::Config;
use fks_futures::features::{self, HEALTH, METRICS};
use fks_futures::metrics::MetricsRegistry;
use fks_futures::service::Service;
use fks_futures::ServiceError;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A service running in the background.
struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<fks_futures::Result<()>>,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn shutdown(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap().unwrap();
    }
}

async fn spawn_on(service: Service, listener: TcpListener) -> Running {
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(service.serve(listener, async move {
        let _ = stopped.await;
    }));

    Running { addr, stop, task }
}

async fn spawn(service: Service) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    spawn_on(service, listener).await
}

fn loopback_config() -> Config {
    Config {
        service_host: "127.0.0.1".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_default_service_serves_all_endpoints() {
    let running = spawn(Service::from_config(&loopback_config())).await;
    let client = reqwest::Client::new();

    let root = client.get(running.url("/")).send().await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    let body: Value = root.json().await.unwrap();
    assert_eq!(body["service"], "fks_futures");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["health"], "/health");

    let metrics = client.get(running.url("/metrics")).send().await.unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    assert_eq!(
        metrics.headers()["content-type"],
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let text = metrics.text().await.unwrap();
    assert!(text
        .lines()
        .any(|l| l == r#"fks_build_info{service="fks_futures",version="1.0.0"} 1"#));

    let health = client.get(running.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let ready = client.get(running.url("/health/ready")).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);

    running.shutdown().await;
}

#[tokio::test]
async fn test_metrics_scrapes_are_identical() {
    let running = spawn(Service::from_config(&loopback_config())).await;
    let client = reqwest::Client::new();

    let first = client.get(running.url("/metrics")).send().await.unwrap().text().await.unwrap();
    let second = client.get(running.url("/metrics")).send().await.unwrap().text().await.unwrap();
    assert_eq!(first, second);

    running.shutdown().await;
}

#[tokio::test]
async fn test_broken_health_module_degrades_to_not_found() {
    let service = Service::builder()
        .metrics(|| Ok(MetricsRegistry::new()))
        .feature(HEALTH, || -> Result<Router, ServiceError> {
            panic!("health module failed to import")
        })
        .build();

    assert_eq!(service.features().absent().len(), 1);
    assert_eq!(service.features().absent()[0].0, HEALTH);

    let lifecycle = service.lifecycle().clone();
    let running = spawn(service).await;
    let client = reqwest::Client::new();

    let health = client.get(running.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::NOT_FOUND);

    let root = client.get(running.url("/")).send().await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);

    let metrics = client.get(running.url("/metrics")).send().await.unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);

    assert!(lifecycle.is_ready());

    running.shutdown().await;
}

#[tokio::test]
async fn test_disabled_features_leave_root_and_docs() {
    let config = Config {
        metrics_enabled: false,
        health_enabled: false,
        ..loopback_config()
    };
    let service = Service::from_config(&config);
    assert!(!service.features().is_present(METRICS));
    assert!(!service.features().is_present(features::HEALTH));

    let running = spawn(service).await;
    let client = reqwest::Client::new();

    for (path, expected) in [
        ("/", StatusCode::OK),
        ("/openapi.json", StatusCode::OK),
        ("/metrics", StatusCode::NOT_FOUND),
        ("/health", StatusCode::NOT_FOUND),
    ] {
        let response = client.get(running.url(path)).send().await.unwrap();
        assert_eq!(response.status(), expected, "{path}");
    }

    running.shutdown().await;
}

#[tokio::test]
async fn test_service_port_selects_listen_port() {
    // Reserve a free port, then hand it to the service through SERVICE_PORT.
    let port = {
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap().port()
    };
    let config: Config = envy::from_iter(vec![
        ("SERVICE_PORT".to_string(), port.to_string()),
        ("SERVICE_HOST".to_string(), "127.0.0.1".to_string()),
    ])
    .unwrap();

    let addr = config.listen_addr().unwrap();
    assert_eq!(addr.port(), port);

    let listener = TcpListener::bind(addr).await.unwrap();
    let running = spawn_on(Service::from_config(&config), listener).await;
    assert_eq!(running.addr.port(), port);

    let response = reqwest::get(format!("http://127.0.0.1:{port}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    running.shutdown().await;
}
