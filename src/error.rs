//! Unified error types for the futures service.

use thiserror::Error;

/// Unified error type for the futures service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An optional feature could not be acquired.
    #[error("feature {feature} unavailable: {reason}")]
    FeatureUnavailable {
        /// Feature name.
        feature: String,
        /// Why it could not be loaded.
        reason: String,
    },

    /// The metrics subsystem could not be initialized.
    #[error("metrics subsystem unavailable: {0}")]
    MetricsUnavailable(String),

    /// IO error (socket bind, serve loop).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
