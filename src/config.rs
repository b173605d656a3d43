//! Service configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;

use crate::error::ServiceError;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub service_port: u16,

    /// HTTP listen address (all interfaces by default).
    #[serde(default = "default_host")]
    pub service_host: String,

    /// Log level / filter directives.
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    // === Optional Features ===
    /// Expose the build-info metrics endpoint.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Mount the health-check routes.
    #[serde(default = "default_true")]
    pub health_enabled: bool,

    // === Cross-Origin Policy ===
    /// Comma-separated origins allowed by CORS. Unset mirrors any origin.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_port() -> u16 {
    8015
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_port: default_port(),
            service_host: default_host(),
            rust_log: default_log_level(),
            metrics_enabled: true,
            health_enabled: true,
            cors_allowed_origins: None,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        self.host_ip()?;
        Ok(())
    }

    /// Parsed listen host.
    fn host_ip(&self) -> Result<IpAddr, String> {
        self.service_host.parse().map_err(|_| {
            format!(
                "SERVICE_HOST must be an IP address, got {:?}",
                self.service_host
            )
        })
    }

    /// Socket address the HTTP server binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, ServiceError> {
        let ip = self.host_ip().map_err(ServiceError::InvalidConfig)?;
        Ok(SocketAddr::new(ip, self.service_port))
    }

    /// Explicit CORS origin list, if one is configured.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
