//! Error types for the put.io Feed Operator

use thiserror::Error;

use crate::adapters::GatewayError;

/// Result type alias using the operator's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Operator error types
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// put.io API error
    #[error("put.io API error: {0}")]
    Gateway(#[from] GatewayError),

    /// Pause/resume failed after the feed fields were already committed remotely
    #[error("unable to sync pause state of put.io feed {id}: {source}")]
    PauseSync {
        id: u64,
        #[source]
        source: GatewayError,
    },

    /// Deletion requested but no put.io feed id was ever recorded in status
    #[error("cannot delete Feed {0} without its put.io id")]
    MissingRemoteId(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Secret not found
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    /// Secret key not found
    #[error("Secret key '{key}' not found in secret '{secret}'")]
    SecretKeyNotFound { secret: String, key: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}
