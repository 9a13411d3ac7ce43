//! Cloud orchestration error types

use thiserror::Error;

/// Errors raised while building a configuration or reconciling it against the cloud
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Cannot apply `{step}`: `{requires}` must be defined first")]
    PrecedingStepMissing {
        step: &'static str,
        requires: &'static str,
    },

    #[error("Remote operation `{operation}` failed: {message}")]
    RemoteOperation { operation: String, message: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(step: &'static str, requires: &'static str) -> Self {
        Self::PrecedingStepMissing { step, requires }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
